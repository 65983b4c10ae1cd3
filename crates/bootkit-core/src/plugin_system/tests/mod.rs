mod support;

mod instance_tests;
mod status_tests;
