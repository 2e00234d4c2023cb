use std::io::Read;

use clap::Parser;
use serde_json::Value;

use json_path_finder as jpf;

/// Query a JSON document with an RFC 9535 JSONPath expression.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON document (string), or `-` to read from stdin.
    json: String,
    /// JSONPath expression, e.g. `$.store.book[?@.price < 10].title`
    path: String,
    /// Show only the first match
    #[arg(long)]
    first: bool,
    /// Deduplicate results
    #[arg(long)]
    unique: bool,
    /// Fallback default JSON when nothing matches
    #[arg(long)]
    default: Option<String>,
    /// Pretty-print output
    #[arg(long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt::init();

    // Parse CLI arguments.
    let args = Args::parse();

    // Read the document, from stdin if requested.
    let json = if args.json == "-" {
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            eprintln!("cannot read stdin: {e}");
            std::process::exit(1);
        }
        buf
    } else {
        args.json.clone()
    };

    // Query the path.
    let mut matches = match jpf::find(&json, &args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Post-process results as requested.
    if args.unique {
        matches = jpf::unique(&matches);
    }
    let out: Value = if args.first {
        jpf::first(&matches)
    } else if let Some(def) = args.default.as_deref() {
        jpf::or_default(&matches, def)
    } else {
        Value::Array(matches)
    };

    // Output result.
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&out)
    } else {
        serde_json::to_string(&out)
    };
    println!("{}", rendered.unwrap());
}
