//! Help-tree export example.
//!
//! Builds a command tree and serializes its help document to JSON, showing
//! how the same metadata that drives usage text can be consumed as data.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example export_help
//! ```

use cmdtree_core::{Command, ErrorPolicy};

fn main() {
    let mut cli = Command::new("bckp", ErrorPolicy::ContinueOnError);
    cli.flag_bool("verbose", false, "chatty output", true).unwrap();

    let put = cli.add_child("put");
    put.flag_str("nest", "", "directory to archive `into`", true).unwrap();
    put.flag_bool("zip", false, "compress the archive", true).unwrap();

    let pop = cli.add_child("pop");
    pop.flag_bool("discard", false, "remove after restoring", true).unwrap();

    let doc = cli.help_doc();
    println!("{}", serde_json::to_string_pretty(&doc).unwrap());
    println!();
    println!("rendered:");
    println!("{doc}");
}
