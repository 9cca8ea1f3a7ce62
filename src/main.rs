use {
    anyhow::{bail, Context, Result},
    huffile::{analyze, compress, compress_file, decompress, CompressionStats, FrequencyTable},
    std::{
        env, fs,
        io::{self, prelude::*},
        path::Path,
        process,
        time::{Duration, Instant},
    },
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["compress", path] => {
            let bytes = read_input(path)?;
            let started = Instant::now();
            let compressed = compress(&bytes)?;
            eprintln!("{}", summary(&compressed.stats, started.elapsed()));
            write_stdout(&compressed.container)
        }
        ["decompress", path] => {
            let bytes = decompress(&read_input(path)?)
                .with_context(|| format!("cannot decompress {}", path))?;
            write_stdout(&bytes)
        }
        ["analyze", path] => {
            print_analysis(path, &analyze(&read_input(path)?));
            Ok(())
        }
        ["batch", out_dir, paths @ ..] if !paths.is_empty() => batch(Path::new(out_dir), paths),
        _ => print_usage(),
    }
}

fn print_usage() -> ! {
    println!("Usage:");
    println!("  huffile compress <path>               Compress a file and write it to stdout");
    println!("  huffile compress -                    Compress stdin and write it to stdout");
    println!("  huffile decompress <path>             Decompress a file and write it to stdout");
    println!("  huffile decompress -                  Decompress stdin and write it to stdout");
    println!("  huffile analyze <path>                Print byte statistics of a file");
    println!("  huffile batch <dir> <path>...         Compress each file to <dir>/<name>.huf");
    process::exit(1)
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).context("cannot read stdin")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("cannot read {}", path))
    }
}

fn write_stdout(bytes: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    Ok(())
}

fn batch(out_dir: &Path, paths: &[&str]) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;

    let mut total = CompressionStats::default();
    let mut elapsed = Duration::default();
    let mut failed = 0;
    for (i, path) in paths.iter().enumerate() {
        let input = Path::new(path);
        let mut name = input.file_stem().unwrap_or_else(|| input.as_os_str()).to_os_string();
        name.push(".huf");
        let output = out_dir.join(name);

        println!("[{}/{}] {}", i + 1, paths.len(), path);
        let started = Instant::now();
        let result = compress_file(input, &output);
        let took = started.elapsed();
        elapsed += took;
        match result {
            Ok(stats) => {
                println!("  {}", summary(&stats, took));
                println!("  saved as {}", output.display());
                total.original_size += stats.original_size;
                total.compressed_size += stats.compressed_size;
            }
            Err(err) => {
                println!("  failed: {}", err);
                failed += 1;
            }
        }
    }

    println!();
    println!("Total original size:   {}", format_size(total.original_size));
    println!("Total compressed size: {}", format_size(total.compressed_size));
    if let (Some(ratio), Some(savings)) = (total.ratio(), total.savings()) {
        println!("Overall ratio:         {:.2}:1", ratio);
        println!("Overall savings:       {:.1}%", savings);
    }
    println!("Total time:            {}", format_duration(elapsed));

    if failed > 0 {
        bail!("{} of {} files could not be compressed", failed, paths.len());
    }
    Ok(())
}

fn summary(stats: &CompressionStats, elapsed: Duration) -> String {
    let mut line = format!(
        "{} -> {} in {}, {} distinct symbols",
        format_size(stats.original_size),
        format_size(stats.compressed_size),
        format_duration(elapsed),
        stats.distinct_symbols,
    );
    if let (Some(ratio), Some(savings)) = (stats.ratio(), stats.savings()) {
        line += &format!(", ratio {:.2}:1, savings {:.1}% ({})", ratio, savings, rating(savings));
    }
    line
}

fn rating(savings: f64) -> &'static str {
    match savings {
        s if s > 50.0 => "EXCELLENT",
        s if s > 30.0 => "GOOD",
        s if s > 10.0 => "FAIR",
        _ => "POOR",
    }
}

fn format_duration(elapsed: Duration) -> String {
    format!("{:.3} s", elapsed.as_secs_f64())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

fn print_analysis(path: &str, frequencies: &FrequencyTable) {
    let total = frequencies.total();
    println!("File: {}", path);
    println!("Size: {} ({} bytes)", format_size(total), total);
    println!("Unique bytes: {}", frequencies.distinct());
    println!("Entropy: {:.4} bits per byte", frequencies.entropy());

    let top = frequencies.most_frequent(10);
    if top.is_empty() {
        return;
    }
    println!("Most frequent bytes:");
    for (rank, &(byte, count)) in top.iter().enumerate() {
        println!(
            "  {:>2}. {:<9} {} ({:.2}%)",
            rank + 1,
            display_byte(byte),
            count,
            frequencies.share(byte) * 100.0,
        );
    }
}

fn display_byte(byte: u8) -> String {
    match byte {
        b' ' => "SPACE".to_owned(),
        b'\n' => "NEWLINE".to_owned(),
        b'\t' => "TAB".to_owned(),
        b'\r' => "CR".to_owned(),
        _ if byte.is_ascii_graphic() => format!("'{}'", byte as char),
        _ => format!("{:#04x}", byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_time_and_rating() {
        let stats = CompressionStats {
            original_size: 4096,
            compressed_size: 1024,
            distinct_symbols: 12,
        };
        assert_eq!(
            summary(&stats, Duration::from_millis(1500)),
            "4.00 KB -> 1.00 KB in 1.500 s, 12 distinct symbols, \
             ratio 0.25:1, savings 75.0% (EXCELLENT)",
        );
    }

    #[test]
    fn summary_of_empty_input_has_no_ratio() {
        let stats = CompressionStats {
            original_size: 0,
            compressed_size: 14,
            distinct_symbols: 0,
        };
        assert_eq!(
            summary(&stats, Duration::from_micros(250)),
            "0 B -> 14 B in 0.000 s, 0 distinct symbols",
        );
    }

    #[test]
    fn ratings() {
        assert_eq!(rating(60.0), "EXCELLENT");
        assert_eq!(rating(40.0), "GOOD");
        assert_eq!(rating(20.0), "FAIR");
        assert_eq!(rating(-5.0), "POOR");
    }
}
