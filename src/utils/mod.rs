pub mod date_input;
pub mod working_days;
