#[cfg(test)]
mod section_tests;
