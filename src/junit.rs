use std::fs::File;
use std::path::Path;

use junit_report::{Duration, Report, ReportBuilder, TestCaseBuilder, TestSuiteBuilder};

use crate::error::{TbError, TbResult};
use crate::testbench::TbReport;

pub fn build_report(suite: &str, test: &str, r: &TbReport, secs: f64) -> Report {
    let time = Duration::seconds_f64(secs);
    let tc = match r.passed() {
        true => TestCaseBuilder::success(test, time),
        false => TestCaseBuilder::failure(
            test,
            time,
            "failure",
            &format!("{} ({})", r.verdict(), r.end),
        ),
    }
    .build();

    let test_suite = TestSuiteBuilder::new(suite).add_testcase(tc).build();
    ReportBuilder::new().add_testsuite(test_suite).build()
}

pub fn create_junit_xml(path: &Path, suite: &str, test: &str, r: &TbReport, secs: f64) -> TbResult<()> {
    let file = File::create(path)?;
    build_report(suite, test, r, secs)
        .write_xml(file)
        .map_err(|e| TbError::Report(format!("{:?}", e)))
}
