mod formatter;

pub use formatter::TraceFormatter;
