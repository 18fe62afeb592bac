use num_format::{Locale, ToFormattedString};
use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Cell, Row, Table};

use crate::testbench::TbReport;

fn row(name: &str, value: String) -> Row {
    Row::new(vec![Cell::new(name), Cell::new(&value).style_spec("r")])
}

/// End-of-run summary table.
pub fn summary_table(r: &TbReport) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(vec![Cell::new("RUN SUMMARY"), Cell::new("")]));
    table.add_row(row("Result", if r.passed() { "passed" } else { "failed" }.to_string()));
    table.add_row(row("Ended by", r.end.to_string()));
    table.add_row(row("Cycles", r.cycles.to_formatted_string(&Locale::en)));
    table.add_row(row("Checks scheduled", r.scheduled.to_formatted_string(&Locale::en)));
    table.add_row(row("Responses received", r.received.to_formatted_string(&Locale::en)));
    table.add_row(row("Transactions checked", r.checked.to_formatted_string(&Locale::en)));
    table.add_row(row("Errors", r.errors.to_formatted_string(&Locale::en)));
    table.add_row(row("Unchecked expectations", r.pending.to_formatted_string(&Locale::en)));
    table.add_row(row("Interrupts", r.irq_events.to_formatted_string(&Locale::en)));
    table.add_row(row("Requests accepted", r.accepted.to_formatted_string(&Locale::en)));
    table.add_row(row("Responses dropped", r.dropped.to_formatted_string(&Locale::en)));
    table.add_row(row("Reads in flight", r.outstanding.to_formatted_string(&Locale::en)));
    table.add_row(row("Seed", r.seed.to_string()));
    table
}

pub fn render(r: &TbReport) -> String {
    format!("{}{}", summary_table(r), r.verdict())
}
