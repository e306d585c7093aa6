mod fixtures;
mod emission_tests;
mod editor_tests;
