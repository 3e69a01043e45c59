/// Outcome of one unit-test invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub test_id: String,
    pub iteration: i64,
    pub result: String,
    pub passed: bool,
}

pub trait ResultStore {
    fn record(&self, table_name: &str, result: &TestResult) -> Result<(), String>;
}
