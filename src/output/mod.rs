pub mod formatter;
pub mod writer;

pub use formatter::{
    format_diagnostics, format_evaluation, format_model_list, format_score, format_scored_table,
    format_tsv, should_use_colors,
};
pub use writer::{format_csv, write_csv};
