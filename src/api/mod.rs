//! Purpose: Define the stable public Rust API boundary for batchkit.
//! Exports: Config, table, dump, plot, and report entry points plus errors.
//! Role: Public, additive-only surface; callers should not reach into `core` paths.
//! Invariants: Everything a batch script needs is re-exported here.

pub use crate::core::conf::{
    ConfMap, ConfOptions, Malformed, ParseReport, SkippedLine, parse_conf, parse_conf_report,
    read_conf, read_conf_report, render_conf, write_conf,
};
pub use crate::core::dump::{dump_value, load_value};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::plot::{PlotOptions, Series, plot_series, plot_xy};
pub use crate::core::report::{Color, paint, render_line, report, report_color};
pub use crate::core::table::{
    TableReadOptions, TableWriteOptions, read_table, save_table, select_columns,
};
pub use crate::core::value::Value;
