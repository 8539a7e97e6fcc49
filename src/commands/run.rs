use std::time::Duration;

use anyhow::Result;
use tracing::info;

use coursegrab_client::SessionClient;
use coursegrab_core::{AppConfig, Credentials, DesiredCourses, Endpoints};
use coursegrab_engine::{AuthBackoff, RegistrationEngine, RunSummary, Scheduler};
use coursegrab_parser::ResponseClassifier;

pub async fn run(config: AppConfig) -> Result<()> {
    config.validate()?;

    let credentials = Credentials::new(&config.account.username, &config.account.password);
    let desired = DesiredCourses::new(config.courses.codes.clone());

    println!("╔══════════════════════════════════════════════╗");
    println!("║ Account:   {:<33} ║", config.account.username);
    println!("║ Password:  {:<33} ║", "********");
    println!("║ Courses:   {:<33} ║", desired.codes().join(", "));
    println!("║ Delay:     {:<33} ║", format!("{}ms", config.courses.retry_delay_ms));
    println!("╚══════════════════════════════════════════════╝");

    let endpoints = Endpoints::new(&config.portal.base_url)?;
    let classifier = ResponseClassifier::from_portal(&config.portal);
    let engine = RegistrationEngine::new(endpoints, classifier, credentials);

    let scheduler = Scheduler::new(
        Duration::from_millis(config.courses.retry_delay_ms),
        AuthBackoff::new(
            Duration::from_millis(config.retry.auth_backoff_base_ms),
            Duration::from_millis(config.retry.auth_backoff_cap_ms),
        ),
    );

    let portal = config.portal.clone();
    let run = scheduler.run(&engine, desired, move || SessionClient::new(&portal));

    tokio::select! {
        result = run => {
            print_summary(&result?);
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            Ok(())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n╔══════════════════════════════════════════════╗");
    println!("║            Registration Summary              ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║ Rounds:       {:>28}   ║", summary.rounds);
    println!("║ Registered:   {:>28}   ║", summary.registered.len());
    println!("╚══════════════════════════════════════════════╝");
    for code in &summary.registered {
        println!("  ✓ {code}");
    }
}
