use crate::cli::args::CliArgs;
use crate::export::ExportFormat;

/// Parses `MONTH.N` (both 1-based) into zero-based `(month, index)`.
pub fn parse_show_target(raw: &str) -> Result<(usize, usize), String> {
    let (month, index) = raw
        .trim()
        .split_once('.')
        .ok_or_else(|| "expected MONTH.N, e.g. 3.1".to_string())?;
    let month: usize = month
        .trim()
        .parse()
        .map_err(|_| format!("invalid month '{month}'"))?;
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid training number '{index}'"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month {month} out of range, expected 1-12"));
    }
    if index == 0 {
        return Err("training number starts at 1".to_string());
    }
    Ok((month - 1, index - 1))
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if !args.init_config && args.category.as_deref().unwrap_or_default().trim().is_empty() {
        return Err("a category is required (-k/--category)".to_string());
    }
    for month in args.expand.iter() {
        if !(1..=12).contains(month) {
            return Err(format!("invalid --expand {month}, expected 1-12"));
        }
    }
    if let Some(raw) = args.show.as_deref() {
        parse_show_target(raw).map_err(|e| format!("invalid --show '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if ExportFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected pdf, html or json"
            ));
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    Ok(())
}
