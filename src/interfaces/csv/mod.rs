pub mod fields_reader;
