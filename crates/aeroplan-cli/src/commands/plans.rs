use aeroplan_core::config::AppConfig;
use aeroplan_core::plan::PlanRepository;
use aeroplan_infrastructure::CsvPlanStore;
use anyhow::Result;
use colored::Colorize;

/// Prints the path of the newest assembly plan.
pub async fn run(config: AppConfig) -> Result<()> {
    let store = CsvPlanStore::from_config(&config.artifacts);
    match store.latest().await? {
        Some(path) => println!("{}", path.display()),
        None => println!(
            "{}",
            format!(
                "No assembly_plan_*.csv file found in {}. Generate an assembly plan first.",
                store.plans_dir().display()
            )
            .yellow()
        ),
    }
    Ok(())
}
