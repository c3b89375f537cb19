#[path = "../fixtures/mod.rs"]
mod fixtures;

mod test_cli_entry_point;
mod test_end_to_end;
mod test_error_handling;
