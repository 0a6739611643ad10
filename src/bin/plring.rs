use music_ring::{
    default_playlist_file,
    playlist::*,
    track::*,
};
use anyhow::{anyhow, Context, Result};
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[derive(Parser)]
#[command(about = "Manage a playlist of (title, artist) tracks")]
struct Cli {
    #[arg(short, long, help = "Playlist file to operate on [default: ~/Music/Playlists/playlist.csv]")]
    file: Option<Utf8PathBuf>,

    #[arg(long, default_value_t = DEFAULT_MAX_TRACKS, help = "Refuse to hold more than this many tracks")]
    max_tracks: usize,

    #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
    verbose: u8,

    #[arg(short, long, help = "Only log errors")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a track to the end of the playlist
    Add {
        title: String,
        artist: String,
    },
    /// Remove the first track matching both title and artist
    Remove {
        title: String,
        artist: String,
    },
    /// Shuffle the playlist
    Shuffle,
    /// Print the playlist
    Show,
    /// Run the interactive menu
    Menu,
}

/// Rejects input that the playlist file format cannot represent.
fn check_field(field: &str, what: &str) -> Result<()> {
    if field.is_empty() {
        return Err(anyhow!("The {} must not be empty", what));
    }
    if field.contains([FIELD_SEPARATOR, '\n', '\r']) {
        return Err(anyhow!("The {} must not contain '{}' or line breaks", what, FIELD_SEPARATOR));
    }
    Ok(())
}

fn display(playlist: &Playlist) {
    if playlist.is_empty() {
        println!("The playlist is empty.");
        return;
    }
    println!("{}", "Current Playlist:".bold());
    for (i, track) in playlist.tracks().enumerate() {
        println!("{:>4}. '{}' by {}", i + 1, track.title().cyan(), track.artist().green());
    }
}

fn add(playlist: &mut Playlist, title: &str, artist: &str) -> Result<()> {
    check_field(title, "title")?;
    check_field(artist, "artist")?;
    if playlist.contains(title, artist) {
        println!("'{}' by {} is already in the playlist, adding it again.", title, artist);
    }
    playlist.add(title, artist)?;
    println!("Added '{}' by {} to the playlist.", title, artist);
    Ok(())
}

fn remove(playlist: &mut Playlist, title: &str, artist: &str) -> bool {
    match playlist.remove(title, artist) {
        Some(track) => {
            println!("Removed {} from the playlist.", track);
            true
        },
        None if playlist.is_empty() => {
            println!("The playlist is empty.");
            false
        },
        None => {
            println!("'{}' by {} not found in the playlist.", title, artist);
            false
        },
    }
}

fn shuffle(playlist: &mut Playlist) {
    if playlist.is_empty() {
        println!("The playlist is empty.");
        return;
    }
    println!("Shuffling the playlist...");
    playlist.shuffle();
}

/// Prints `prompt` and reads one line from stdin, without the line terminator.
/// Returns `None` at end of input.
fn ask(prompt: &str) -> Result<Option<String>> {
    let mut stdout = io::stdout();
    print!("{}", prompt);
    stdout.flush()?;

    let mut ans = String::with_capacity(64);
    if io::stdin().lock().read_line(&mut ans)? == 0 {
        return Ok(None);
    }
    Ok(Some(ans.trim_end_matches(['\n', '\r']).to_string()))
}

/// Asks for a title and an artist. Returns `None` at end of input.
fn ask_track(verb: &str) -> Result<Option<(String, String)>> {
    let title = match ask(&format!("Enter the title of the song{}: ", verb))? {
        Some(title) => title,
        None => return Ok(None),
    };
    let artist = match ask(&format!("Enter the artist of the song{}: ", verb))? {
        Some(artist) => artist,
        None => return Ok(None),
    };
    Ok(Some((title, artist)))
}

/// The interactive menu loop. Owns `playlist` for the whole session; loading a file replaces it.
fn menu(mut playlist: Playlist) -> Result<()> {
    loop {
        println!();
        println!("{}", "Music Playlist Manager".bold());
        println!("1. Add a song to the playlist");
        println!("2. Remove a song from the playlist");
        println!("3. Shuffle the playlist");
        println!("4. Display the playlist");
        println!("5. Save playlist to a file");
        println!("6. Load playlist from a file");
        println!("7. Exit");

        let choice = match ask("Enter your choice: ")? {
            Some(choice) => choice,
            None => break,
        };
        match choice.trim() {
            "1" => {
                if let Some((title, artist)) = ask_track("")? {
                    if let Err(e) = add(&mut playlist, &title, &artist) {
                        error!("Failed to add '{}' by {}: {}", title, artist, e);
                    }
                }
            },
            "2" => {
                if let Some((title, artist)) = ask_track(" to remove")? {
                    remove(&mut playlist, &title, &artist);
                }
            },
            "3" => shuffle(&mut playlist),
            "4" => display(&playlist),
            "5" => {
                let fpath = match ask("Enter the filename to save the playlist: ")? {
                    Some(fpath) => Utf8PathBuf::from(fpath.trim()),
                    None => break,
                };
                match playlist.write(&fpath) {
                    Ok(()) => println!("Playlist saved to {}.", fpath),
                    Err(e) => error!("Failed to save the playlist to '{}': {}", fpath, e),
                }
            },
            "6" => {
                let fpath = match ask("Enter the filename to load the playlist from: ")? {
                    Some(fpath) => Utf8PathBuf::from(fpath.trim()),
                    None => break,
                };
                match Playlist::open_with_max_tracks(&fpath, playlist.max_tracks()) {
                    Ok(loaded) => {
                        playlist = loaded;
                        println!("Playlist loaded from {}.", fpath);
                    },
                    Err(e) => error!("Failed to load the playlist from '{}': {}", fpath, e),
                }
            },
            "7" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
    if playlist.is_modified() {
        info!("Exiting with unsaved changes");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let fpath = match cli.file {
        Some(fpath) => fpath,
        None => default_playlist_file()
            .ok_or_else(|| anyhow!("Failed to locate the home directory, pass --file instead"))?
            .to_owned(),
    };
    let mut playlist = Playlist::open_or_new_with_max_tracks(&fpath, cli.max_tracks)
        .with_context(|| format!("Failed to read '{}'", fpath))?;

    match cli.command {
        Commands::Add { title, artist } => add(&mut playlist, &title, &artist)?,
        Commands::Remove { title, artist } => {
            remove(&mut playlist, &title, &artist);
        },
        Commands::Shuffle => shuffle(&mut playlist),
        Commands::Show => display(&playlist),
        Commands::Menu => return menu(playlist),
    }

    if playlist.is_modified() {
        if let Some(dir) = fpath.parent().filter(|x| !x.as_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory '{}'", dir))?;
        }
        playlist.write(&fpath)
            .with_context(|| format!("Failed to write to '{}'", fpath))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    stderrlog::new()
        .module(module_path!())
        .module("music_ring")
        .quiet(cli.quiet)
        .verbosity(1 + cli.verbose as usize)
        .init()
        .unwrap();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
