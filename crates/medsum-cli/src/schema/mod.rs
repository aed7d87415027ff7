pub mod patient_db;
