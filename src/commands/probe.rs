use anyhow::Result;

use coursegrab_client::SessionClient;
use coursegrab_core::{AppConfig, Credentials, DesiredCourses, Endpoints};
use coursegrab_engine::RegistrationEngine;
use coursegrab_parser::ResponseClassifier;

pub async fn run(config: AppConfig) -> Result<()> {
    config.validate()?;

    let credentials = Credentials::new(&config.account.username, &config.account.password);
    let desired = DesiredCourses::new(config.courses.codes.clone());

    let endpoints = Endpoints::new(&config.portal.base_url)?;
    let classifier = ResponseClassifier::from_portal(&config.portal);
    let engine = RegistrationEngine::new(endpoints, classifier, credentials);

    let session = SessionClient::new(&config.portal)?;
    let probes = engine.probe_round(&session, &desired).await?;

    println!("Course status ({}):\n", probes.len());
    for probe in &probes {
        println!("  {:<12} {}", probe.code, probe.status);
    }

    Ok(())
}
