//! Writes `mx25flash.1` plus one `mx25flash-<command>.1` page per subcommand
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::{Command, CommandFactory};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
mod cli;

fn write_page(cmd: Command, title: &str, dir: &Path) -> io::Result<PathBuf> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).title(title).render(&mut buffer)?;
    let path = dir.join(format!("{}.1", title));
    fs::write(&path, buffer)?;
    Ok(path)
}

/// Render every page into `dir`, returning the files written
fn render_pages(dir: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let cmd = cli::Cli::command();
    let mut pages = vec![write_page(cmd.clone(), "mx25flash", dir)?];
    for sub in cmd.get_subcommands() {
        let title = format!("mx25flash-{}", sub.get_name());
        pages.push(write_page(sub.clone(), &title, dir)?);
    }
    Ok(pages)
}

fn main() -> io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    let pages = render_pages(&output_dir)?;
    for page in &pages {
        println!("{}", page.display());
    }
    println!(
        "{} pages written; preview with: man -l {}",
        pages.len(),
        output_dir.join("mx25flash.1").display()
    );
    Ok(())
}
