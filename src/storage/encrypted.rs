//! SQLite-backed diagnosis store. The raw measurement payload is stored AES-GCM
//! encrypted; class, confidence, BMI and timestamp stay in clear for listing.
//! Key derived from a deployment secret.

use super::{
    AccountKind, DiagnosisEntry, DiagnosisSummary, Patient, PatientId, PatientProfile, PatientSummary,
};
use crate::error::StoreError;
use crate::measurement::MeasurementRecord;
use crate::risk::Assessment;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use rand::RngCore;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn derive_key(seed: &[u8]) -> [u8; KEY_LEN] {
    use ring::digest;
    let mut out = [0u8; KEY_LEN];
    let h = digest::digest(&digest::SHA256, seed);
    out[..h.as_ref().len().min(KEY_LEN)].copy_from_slice(h.as_ref());
    out
}

fn encrypt(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<String, StoreError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| StoreError::Crypto(e.to_string()))?;
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    let ciphertext = cipher.encrypt((&nonce).into(), plaintext)?;
    let mut out = nonce.to_vec();
    out.extend(ciphertext);
    Ok(BASE64.encode(&out))
}

fn decrypt(key: &[u8; KEY_LEN], encoded: &str) -> Result<Vec<u8>, StoreError> {
    let raw = BASE64.decode(encoded)?;
    if raw.len() < NONCE_LEN {
        return Err(StoreError::Crypto("payload too short".to_string()));
    }
    let (nonce, ct) = raw.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| StoreError::Crypto(e.to_string()))?;
    Ok(cipher.decrypt(nonce.into(), ct)?)
}

fn format_ts(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

pub struct DiagnosisStore {
    conn: Mutex<Connection>,
    key: [u8; KEY_LEN],
}

impl DiagnosisStore {
    /// Open or create DB at path. Key is derived from `secret`.
    pub fn open(path: &Path, secret: &[u8]) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn, secret)
    }

    pub fn open_in_memory(secret: &[u8]) -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, secret)
    }

    fn init(conn: Connection, secret: &[u8]) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                kind TEXT NOT NULL DEFAULT 'paciente',
                birth_date TEXT,
                sex TEXT,
                phone TEXT,
                address TEXT,
                dni TEXT,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS measurements (
                id TEXT PRIMARY KEY,
                patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                payload_enc TEXT NOT NULL,
                bmi REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS results (
                id TEXT PRIMARY KEY,
                measurement_id TEXT NOT NULL REFERENCES measurements(id) ON DELETE CASCADE,
                riesgo INTEGER NOT NULL,
                confianza REAL NOT NULL,
                assessed_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_measurements_patient ON measurements(patient_id);
            CREATE INDEX IF NOT EXISTS idx_results_ts ON results(assessed_at);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            key: derive_key(secret),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn register_patient(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<PatientId, StoreError> {
        self.register_account(username, first_name, last_name, AccountKind::Patient)
    }

    pub fn register_account(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
        kind: AccountKind,
    ) -> Result<PatientId, StoreError> {
        let conn = self.lock()?;
        let res = conn.execute(
            "INSERT INTO patients (username, first_name, last_name, kind, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![username, first_name, last_name, kind.as_str(), Utc::now().timestamp_millis()],
        );
        match res {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::PatientExists(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_patient(&self, username: &str) -> Result<Option<Patient>, StoreError> {
        let conn = self.lock()?;
        let patient = conn
            .query_row(
                "SELECT id, username, first_name, last_name, kind FROM patients WHERE username = ?1",
                params![username],
                |row| {
                    let kind: String = row.get(4)?;
                    Ok(Patient {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        first_name: row.get(2)?,
                        last_name: row.get(3)?,
                        kind: if kind == AccountKind::Admin.as_str() {
                            AccountKind::Admin
                        } else {
                            AccountKind::Patient
                        },
                    })
                },
            )
            .optional()?;
        Ok(patient)
    }

    pub fn profile(&self, patient: PatientId) -> Result<PatientProfile, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            r#"
            SELECT first_name, last_name, birth_date, sex, phone, address, dni
            FROM patients WHERE id = ?1
            "#,
            params![patient],
            |row| {
                Ok(PatientProfile {
                    nombre: row.get(0)?,
                    apellido: row.get(1)?,
                    fecha_nacimiento: row.get(2)?,
                    genero: row.get(3)?,
                    telefono: row.get(4)?,
                    direccion: row.get(5)?,
                    dni: row.get(6)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| StoreError::PatientNotFound(patient.to_string()))
    }

    /// Replace every profile field of `patient`.
    pub fn update_profile(&self, patient: PatientId, profile: &PatientProfile) -> Result<(), StoreError> {
        let n = self.lock()?.execute(
            r#"
            UPDATE patients SET
                first_name = ?1, last_name = ?2, birth_date = ?3,
                sex = ?4, phone = ?5, address = ?6, dni = ?7
            WHERE id = ?8
            "#,
            params![
                profile.nombre,
                profile.apellido,
                profile.fecha_nacimiento,
                profile.genero,
                profile.telefono,
                profile.direccion,
                profile.dni,
                patient
            ],
        )?;
        if n == 0 {
            return Err(StoreError::PatientNotFound(patient.to_string()));
        }
        Ok(())
    }

    /// Measurement row plus linked result row, in one transaction.
    pub fn save_diagnosis(
        &self,
        patient: PatientId,
        record: &MeasurementRecord,
        assessment: &Assessment,
    ) -> Result<String, StoreError> {
        let payload = serde_json::to_string(record)?;
        let enc = encrypt(&self.key, payload.as_bytes())?;
        let measurement_id = Uuid::new_v4().to_string();
        let result_id = Uuid::new_v4().to_string();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO measurements (id, patient_id, payload_enc, bmi) VALUES (?1, ?2, ?3, ?4)",
            params![measurement_id, patient, enc, assessment.bmi],
        )?;
        tx.execute(
            "INSERT INTO results (id, measurement_id, riesgo, confianza, assessed_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                result_id,
                measurement_id,
                assessment.prediction.risk_class as i64,
                assessment.prediction.confidence,
                assessment.assessed_at.timestamp_millis()
            ],
        )?;
        tx.commit()?;
        tracing::debug!(patient, result_id = %result_id, "diagnosis saved");
        Ok(result_id)
    }

    pub fn latest_diagnosis(&self, patient: PatientId) -> Result<Option<DiagnosisSummary>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                r#"
                SELECT r.riesgo, r.confianza, r.assessed_at
                FROM results r
                JOIN measurements m ON r.measurement_id = m.id
                WHERE m.patient_id = ?1
                ORDER BY r.assessed_at DESC, r.rowid DESC
                LIMIT 1
                "#,
                params![patient],
                |row| {
                    let riesgo: i64 = row.get(0)?;
                    let confianza: f32 = row.get(1)?;
                    let ts: i64 = row.get(2)?;
                    Ok((riesgo, confianza, ts))
                },
            )
            .optional()?;
        Ok(row.map(|(riesgo, confianza, ts)| DiagnosisSummary {
            riesgo: riesgo as usize,
            confianza,
            fecha: format_ts(ts),
        }))
    }

    /// Every diagnosis of a patient, newest first, with the decrypted measurement.
    pub fn history(&self, patient: PatientId) -> Result<Vec<DiagnosisEntry>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.assessed_at, m.payload_enc, m.bmi, r.riesgo, r.confianza
            FROM results r
            JOIN measurements m ON r.measurement_id = m.id
            WHERE m.patient_id = ?1
            ORDER BY r.assessed_at DESC, r.rowid DESC
            "#,
        )?;
        let mut rows = stmt.query(params![patient])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let ts: i64 = row.get(1)?;
            let enc: String = row.get(2)?;
            let bmi: f64 = row.get(3)?;
            let riesgo: i64 = row.get(4)?;
            let confianza: f32 = row.get(5)?;
            let plain = decrypt(&self.key, &enc)?;
            let measurement: MeasurementRecord = serde_json::from_slice(&plain)?;
            out.push(DiagnosisEntry {
                id,
                fecha: format_ts(ts),
                measurement,
                bmi,
                riesgo: riesgo as usize,
                confianza,
            });
        }
        Ok(out)
    }

    /// Patient accounts matching `filter` (case-insensitive, on username or names),
    /// by first name. Matching runs in Rust since SQLite's LOWER only folds ASCII.
    pub fn list_patients(&self, filter: &str) -> Result<Vec<PatientSummary>, StoreError> {
        let conn = self.lock()?;
        let needle = filter.to_lowercase();
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.username, p.first_name, p.last_name,
                   COUNT(r.id), MAX(r.assessed_at)
            FROM patients p
            LEFT JOIN measurements m ON m.patient_id = p.id
            LEFT JOIN results r ON r.measurement_id = m.id
            WHERE p.kind = ?1
            GROUP BY p.id, p.username, p.first_name, p.last_name
            ORDER BY p.first_name
            "#,
        )?;
        let rows = stmt.query_map(params![AccountKind::Patient.as_str()], |row| {
            let last: Option<i64> = row.get(5)?;
            Ok(PatientSummary {
                id: row.get(0)?,
                username: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                total_diagnoses: row.get(4)?,
                last_diagnosis: last.map(format_ts),
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            let summary = r?;
            let hit = [&summary.username, &summary.first_name, &summary.last_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if hit {
                out.push(summary);
            }
        }
        Ok(out)
    }

    /// Retention: delete diagnoses assessed before `ts` (ms since epoch).
    pub fn prune_before(&self, ts: i64) -> Result<u64, StoreError> {
        let n = self.lock()?.execute(
            "DELETE FROM measurements WHERE id IN (SELECT measurement_id FROM results WHERE assessed_at < ?1)",
            params![ts],
        )?;
        Ok(n as u64)
    }
}
