//! DEC risk entrypoint: one command per run against the local diagnosis store.
//!
//! ```text
//! dec-risk assess <measurement.json|-> [username]
//! dec-risk register <username> <first_name> <last_name> [admin]
//! dec-risk latest <username>
//! dec-risk history <username>
//! dec-risk patients [filter]
//! dec-risk profile <username> [profile.json|-]
//! ```

use dec_risk::{
    config::ServiceConfig,
    error::{DiagnoseError, StoreError},
    logging::StructuredLogger,
    model::OnnxClassifier,
    risk::RiskService,
    storage::{AccountKind, DiagnosisStore, Patient, PatientProfile},
};
use std::io::Read;
use std::sync::Arc;
use tracing::info;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const USAGE: &str = "usage: dec-risk <assess|register|latest|history|patients|profile> [args]";

fn open_store(config: &ServiceConfig) -> Result<DiagnosisStore, BoxError> {
    let secret = config
        .store_secret()
        .ok_or_else(|| format!("{} is not set", config.store.secret_env))?;
    std::fs::create_dir_all(&config.data_dir)?;
    Ok(DiagnosisStore::open(&config.store_path(), secret.as_bytes())?)
}

fn require_patient(store: &DiagnosisStore, username: &str) -> Result<Patient, BoxError> {
    store
        .find_patient(username)?
        .ok_or_else(|| StoreError::PatientNotFound(username.to_string()).into())
}

fn read_body(source: &str) -> Result<String, BoxError> {
    if source == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

fn run_assess(config: &ServiceConfig, source: &str, username: Option<&str>) -> Result<(), BoxError> {
    // Fail fast: no store or model, no serving.
    let store = username.map(|_| open_store(config)).transpose()?;
    let classifier = OnnxClassifier::load(&config.model_path, config.classifier.expected_classes)?;
    let service = RiskService::new(Arc::new(classifier));

    let body = read_body(source)?;
    let assessed = match (store.as_ref(), username) {
        (Some(store), Some(username)) => service
            .diagnose_patient(store, username, &body)
            .map(|(_, assessment)| assessment),
        _ => service
            .assess_json(&body)
            .map(|(_, assessment)| assessment)
            .map_err(DiagnoseError::from),
    };
    let assessment = match assessed {
        Ok(a) => a,
        Err(DiagnoseError::Diagnosis(e)) => {
            StructuredLogger::emit_json(&e.to_body(), &mut std::io::stdout())?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    StructuredLogger::emit_json(&assessment.prediction, &mut std::io::stdout())?;
    Ok(())
}

fn run_profile(config: &ServiceConfig, username: &str, source: Option<&str>) -> Result<PatientProfile, BoxError> {
    let store = open_store(config)?;
    let patient = require_patient(&store, username)?;
    if let Some(source) = source {
        let profile: PatientProfile = serde_json::from_str(&read_body(source)?)?;
        store.update_profile(patient.id, &profile)?;
        info!(patient = %patient.username, "profile updated");
    }
    Ok(store.profile(patient.id)?)
}

fn main() -> Result<(), BoxError> {
    let config_path = ServiceConfig::path_from_env();
    let loaded = ServiceConfig::try_load(&config_path);
    let config = match &loaded {
        Ok(Some(c)) => c.clone(),
        _ => ServiceConfig::default(),
    };
    StructuredLogger::init(config.log.json, &config.log.level);
    if let Err(e) = &loaded {
        tracing::warn!(path = %config_path.display(), error = %e, "config ignored, using defaults");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| args.get(i).map(String::as_str);
    info!(command = ?arg(0), data_dir = ?config.data_dir, "DEC risk starting");

    let mut out = std::io::stdout();
    match (arg(0), arg(1)) {
        (Some("assess"), Some(source)) => run_assess(&config, source, arg(2))?,
        (Some("register"), Some(username)) => {
            let (first, last) = match (arg(2), arg(3)) {
                (Some(f), Some(l)) => (f, l),
                _ => return Err(USAGE.into()),
            };
            let kind = match arg(4) {
                None => AccountKind::Patient,
                Some("admin") => AccountKind::Admin,
                Some(_) => return Err(USAGE.into()),
            };
            let store = open_store(&config)?;
            let id = store.register_account(username, first, last, kind)?;
            let patient = Patient {
                id,
                username: username.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                kind,
            };
            StructuredLogger::emit_json(&patient, &mut out)?;
        }
        (Some("latest"), Some(username)) => {
            let store = open_store(&config)?;
            let patient = require_patient(&store, username)?;
            let latest = store.latest_diagnosis(patient.id)?;
            StructuredLogger::emit_json(&serde_json::json!({ "diagnostico": latest }), &mut out)?;
        }
        (Some("history"), Some(username)) => {
            let store = open_store(&config)?;
            let patient = require_patient(&store, username)?;
            for entry in store.history(patient.id)? {
                StructuredLogger::emit_json(&entry, &mut out)?;
            }
        }
        (Some("patients"), filter) => {
            let store = open_store(&config)?;
            for summary in store.list_patients(filter.unwrap_or(""))? {
                StructuredLogger::emit_json(&summary, &mut out)?;
            }
        }
        (Some("profile"), Some(username)) => {
            let profile = run_profile(&config, username, arg(2))?;
            StructuredLogger::emit_json(&profile, &mut out)?;
        }
        _ => return Err(USAGE.into()),
    }

    Ok(())
}
