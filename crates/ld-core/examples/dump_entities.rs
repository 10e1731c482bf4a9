use ld_core::{ImportedDocument, flatten};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let paths: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("usage: dump_entities <design.json>...");
        return ExitCode::FAILURE;
    }

    let mut failed = 0;
    for path in &paths {
        let input = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("SKIP {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };
        let doc = match ImportedDocument::parse(&input) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("FAIL {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let (w, h) = doc.canvas_size();
        let entities = flatten(&doc.root);
        println!("{} ({w}×{h}, {} entities)", path.display(), entities.len());
        for e in &entities {
            let lock = if e.draggable { " " } else { "🔒" };
            println!(
                "  {:>4} {lock} {:<5} {:<24} {:>8.1},{:<8.1} {:>7.1}×{:<7.1}",
                e.z_order,
                format!("{:?}", e.kind()),
                e.id.as_str(),
                e.x,
                e.y,
                e.width,
                e.height,
            );
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
