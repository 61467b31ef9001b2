//! Purpose: Hold top-level CLI command dispatch for `batchkit`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command output envelopes and exit code semantics stay stable.
use super::*;

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "batchkit", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Conf { command } => dispatch_conf(command, color_mode),
        Command::Table { command } => dispatch_table(command, color_mode),
        Command::Dump { command } => dispatch_dump(command, color_mode),
        Command::Plot(args) => dispatch_plot(args),
    }
}

fn dispatch_conf(command: ConfCommand, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        ConfCommand::Show {
            file,
            strip_to_last,
            fail_malformed,
            json,
        } => {
            let mut options = ConfOptions::new();
            options.strip_to_last = strip_to_last;
            if fail_malformed {
                options.malformed = Malformed::Fail;
            }
            let report = read_conf_report(&file, &options)?;

            for skipped in &report.skipped {
                let mut details = Map::new();
                details.insert("line".to_string(), json!(skipped.line));
                details.insert("text".to_string(), json!(skipped.text));
                notice::emit(&notice::Notice {
                    kind: "skipped-line".to_string(),
                    cmd: "conf show".to_string(),
                    file: file.display().to_string(),
                    message: format!("line {} has no assignment", skipped.line),
                    details,
                });
            }

            let use_color = color_mode.stdout_color();
            if json {
                println!("{}", colorize_value(&Value::Map(report.map), use_color));
            } else {
                for (key, value) in &report.map {
                    if use_color {
                        println!(
                            "{} = {value}",
                            batchkit::api::paint(key, batchkit::api::Color::Cyan)
                        );
                    } else {
                        println!("{key} = {value}");
                    }
                }
            }
            Ok(RunOutcome::ok())
        }
        ConfCommand::Get {
            file,
            key,
            strip_to_last,
        } => {
            let mut options = ConfOptions::new();
            options.strip_to_last = strip_to_last;
            let map = read_conf(&file, &options)?;
            let value = map.get(&key).ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("key `{key}` is not defined"))
                    .with_path(&file)
                    .with_hint("Run `batchkit conf show` to list the keys.")
            })?;
            println!("{value}");
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_table(command: TableCommand, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        TableCommand::Show {
            file,
            delimiter,
            columns,
            json,
        } => {
            let mut options = TableReadOptions::new();
            options.delimiter = delimiter;
            let rows = read_table(&file, &options)?;
            let rows: Vec<Vec<Value>> = if columns.is_empty() {
                rows
            } else {
                rows.iter()
                    .map(|row| {
                        columns
                            .iter()
                            .filter_map(|&index| row.get(index).cloned())
                            .collect()
                    })
                    .collect()
            };

            if json {
                let value = Value::List(rows.into_iter().map(Value::List).collect());
                println!("{}", colorize_value(&value, color_mode.stdout_color()));
            } else {
                for row in &rows {
                    let cells: Vec<String> = row.iter().map(Value::to_string).collect();
                    println!("{}", cells.join("\t"));
                }
            }
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_dump(command: DumpCommand, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        DumpCommand::Show { file } => {
            let value = load_value(&file)?;
            println!("{}", colorize_value(&value, color_mode.stdout_color()));
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_plot(args: PlotArgs) -> Result<RunOutcome, Error> {
    let mut read_options = TableReadOptions::new();
    read_options.delimiter = args.delimiter;
    let rows = read_table(&args.file, &read_options)?;

    let xs = numeric_column(&rows, args.x, &args.file)?;
    let mut series = Vec::new();
    for &column in &args.y {
        let ys = numeric_column(&rows, column, &args.file)?;
        let mut set = Series::new(xs.clone(), ys);
        if args.y.len() > 1 {
            set.label = Some(format!("col {column}"));
        }
        series.push(set);
    }

    let mut options = PlotOptions::new();
    options.title = args.title;
    options.x_label = args.x_label;
    options.y_label = args.y_label;
    options.size = args.size;
    options.grid = !args.no_grid;
    options.axes = !args.no_axes;
    options.line = !args.no_line;
    options.marker_size = args.marker_size;

    plot_series(&args.out, &series, &options)?;

    println!(
        "{}",
        json!({
            "plot": {
                "out": args.out.display().to_string(),
                "series": series.len(),
                "points": xs.len(),
            }
        })
    );
    Ok(RunOutcome::ok())
}

fn numeric_column(
    rows: &[Vec<Value>],
    index: usize,
    path: &std::path::Path,
) -> Result<Vec<f64>, Error> {
    rows.iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let cell = row.get(index).ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("row {row_idx} has no column {index}"))
                    .with_path(path)
            })?;
            cell.as_number().ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!(
                        "column {index} holds a non-numeric cell `{cell}` in row {row_idx}"
                    ))
                    .with_path(path)
            })
        })
        .collect()
}
