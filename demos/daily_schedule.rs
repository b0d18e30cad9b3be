use std::path::PathBuf;

use anyhow::Context;
use dosecurve::prelude::*;
use dosecurve::report::clock_label;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let out_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    let settings_path = out_dir.join("dosecurve_settings.json");

    let settings = PanelSettings::load(&settings_path).context("loading settings")?;
    let model = settings.model()?;
    let times = daily_grid();

    let la_ir = model.simulate(&settings.la_plus_ir(), &times, Carryover::PreviousDay)?;
    let ir_only = model.simulate(&settings.ir_only(), &times, Carryover::PreviousDay)?;

    Report::la_plus_ir("LA + IR Combination (with residual)", &la_ir)?
        .save(&out_dir, "concentration_la_ir")?;
    Report::from_prediction("IR Only (with residual)", &ir_only)?
        .save(&out_dir, "concentration_ir_only")?;
    settings.save(&settings_path)?;

    println!("\n┌──────────────┬──────────┬──────────┬──────────┬──────────┐");
    println!("│ Regimen      │   Cmax   │   Tmax   │   Cmin   │   Cavg   │");
    println!("├──────────────┼──────────┼──────────┼──────────┼──────────┤");
    for (name, prediction) in [("LA + IR", &la_ir), ("IR only", &ir_only)] {
        let s = prediction.summary();
        println!(
            "│ {:<12} │ {:>8.3} │ {:>8} │ {:>8.3} │ {:>8.3} │",
            name,
            s.cmax,
            clock_label(s.tmax),
            s.cmin,
            s.cavg
        );
    }
    println!("└──────────────┴──────────┴──────────┴──────────┴──────────┘\n");

    Ok(())
}
