//! A small archiver CLI built on a command tree.
//!
//! Demonstrates registering typed flags, adding subcommands with aliases,
//! and binding main actions that read the parsed state.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cmdtree-demos --example archiver -- put --nest=backups -z notes.txt
//! cargo run -p cmdtree-demos --example archiver -- pop --discard notes.txt
//! ```

use cmdtree_core::{Command, Duration, ErrorPolicy, EXIT_USAGE};

fn main() {
    let mut cli = Command::new("bckp", ErrorPolicy::ExitOnError);
    cli.flag_bool("verbose", false, "chatty output", true).unwrap();
    cli.flag_duration("timeout", Duration::ZERO, "give up after", true)
        .unwrap();

    {
        let put = cli.add_child("put");
        put.flag_str("nest", "", "directory to archive `into`", true).unwrap();
        put.flag_bool("zip", false, "compress the archive", true).unwrap();
        put.flag_uint("copies", 1, "replica `count`", true).unwrap();
        put.set_main(|cmd| {
            if cmd.n_args() == 0 {
                return Err("nothing to archive".into());
            }
            for file in cmd.args_iter() {
                let nest = cmd.lookup("nest").and_then(|f| f.value.as_str()).unwrap_or("");
                let zipped = cmd.lookup("zip").and_then(|f| f.value.as_bool()) == Some(true);
                println!("archiving {file} into {nest:?} (zip: {zipped})");
            }
            Ok(())
        });
    }
    {
        let pop = cli.add_child("pop");
        pop.flag_bool("discard", false, "remove after restoring", true).unwrap();
        pop.set_main(|cmd| {
            for file in cmd.args_iter() {
                println!("restoring {file}");
            }
            Ok(())
        });
    }
    cli.add_alias("put", &["store"]).unwrap();
    cli.add_alias("pop", &["restore"]).unwrap();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = cli.parse(args) {
        cli.exit(&err.to_string(), EXIT_USAGE);
    }

    // Descend to whichever child the invocation selected and run it.
    for name in ["put", "pop"] {
        let child = cli.child_mut(name).unwrap();
        if child.parsed() {
            let args: Vec<String> = child.args().to_vec();
            if let Err(err) = child.execute(args) {
                eprintln!("{err}");
                std::process::exit(1);
            }
            return;
        }
    }

    cli.help_if(cli.help_wanted());
}
