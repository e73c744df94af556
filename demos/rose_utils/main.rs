//! ROSE asset CLI Utility
//!
//! A command-line tool for inspecting client asset files.
//!
//! # Features
//!
//! - **info**: Load a file and print a short summary
//! - **dump**: Print the decoded file as JSON
//! - **roundtrip**: Decode and re-encode a file, reporting the first differing byte
//! - **vfs-list**: List the entries of a `.IDX` virtual file system index
//!
//! The format is picked from the file extension.
//!
//! # Settings
//!
//! Defaults can be placed in a TOML file (`rose_utils.toml` in the working
//! directory, or the file passed with `--config`) and overridden through
//! `ROSE_UTILS_*` environment variables:
//!
//! ```toml
//! pretty = true
//! log_filter = "info"
//! ```
//!
//! # Usage Examples
//!
//! ```bash
//! # Summarise a motion
//! cargo run --example rose_utils -- info 3DDATA/MOTION/NPC/WALK.ZMO
//!
//! # Dump a conversation as compact JSON
//! cargo run --example rose_utils -- dump 3DDATA/EVENT/OBJECT001.CON --compact
//!
//! # Check that a heightmap survives a decode/encode cycle
//! cargo run --example rose_utils -- roundtrip 3DDATA/MAPS/JUNON/JPT01/30_30.HIM
//!
//! # List map files in the index
//! cargo run --example rose_utils -- vfs-list data.idx --filter maps/junon
//! ```

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use rose_rs::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "rose_utils")]
#[command(author = "rose-rs project")]
#[command(version)]
#[command(about = "ROSE asset utility - inspect, dump and verify client files", long_about = None)]
struct Cli {
	/// Settings file (TOML)
	#[arg(short, long, global = true, value_name = "FILE", env = "ROSE_UTILS_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Display a summary of a file
	Info {
		/// Input file
		#[arg(value_name = "FILE")]
		input: PathBuf,
	},

	/// Print a file as JSON
	Dump {
		/// Input file
		#[arg(value_name = "FILE")]
		input: PathBuf,

		/// Single line output, overrides the settings file
		#[arg(long)]
		compact: bool,
	},

	/// Decode and re-encode a file and compare the bytes
	Roundtrip {
		/// Input file
		#[arg(value_name = "FILE")]
		input: PathBuf,
	},

	/// List the entries of a virtual file system index
	VfsList {
		/// Index file (.IDX)
		#[arg(value_name = "INDEX")]
		input: PathBuf,

		/// Only list entries of this archive
		#[arg(short, long, value_name = "ARCHIVE")]
		system: Option<String>,

		/// Filter by path fragment (case-insensitive)
		#[arg(short = 'p', long, value_name = "PATTERN")]
		filter: Option<String>,

		/// Include deleted entries
		#[arg(short, long)]
		deleted: bool,

		/// Output format
		#[arg(short, long, value_enum, default_value = "table")]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
	/// Aligned columns
	Table,
	/// JSON array
	Json,
}

/// Values read from the settings file and environment.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct Settings {
	/// Pretty print JSON output
	pretty: bool,
	/// Log filter used when `RUST_LOG` is not set
	log_filter: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			pretty: true,
			log_filter: "info".to_string(),
		}
	}
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
	let file = match path {
		Some(path) => config::File::from(path).required(true),
		None => config::File::with_name("rose_utils").required(false),
	};

	let settings = config::Config::builder()
		.add_source(file)
		.add_source(config::Environment::with_prefix("ROSE_UTILS"))
		.build()
		.context("Failed to read settings")?
		.try_deserialize::<Settings>()
		.context("Invalid settings")?;
	Ok(settings)
}

/// A file format the utility can print.
trait Inspect: RoseFile + Serialize + PartialEq {
	/// One line summary.
	fn summary(&self) -> String;
}

impl Inspect for ZmoFile {
	fn summary(&self) -> String {
		let mut text = self.to_string();
		for channel in self.channels() {
			text.push_str(&format!("\n  {:?} -> {}", channel.channel_type(), channel.index()));
		}
		text
	}
}

impl Inspect for ConFile {
	fn summary(&self) -> String {
		let enabled = self.functions().iter().filter(|f| f.enabled).count();
		format!("{}, {} enabled functions", self, enabled)
	}
}

impl Inspect for IdxFile {
	fn summary(&self) -> String {
		let mut text = self.to_string();
		for system in &self.file_systems {
			text.push_str(&format!(
				"\n  {}: {} files ({} deleted)",
				system.filename,
				system.files.len(),
				system.deleted_count()
			));
		}
		text
	}
}

impl Inspect for HimFile {
	fn summary(&self) -> String {
		let root = self.quad_patches()[0];
		format!("{}, height range {:.2} .. {:.2}", self, root.minimum, root.maximum)
	}
}

impl Inspect for TilFile {
	fn summary(&self) -> String {
		format!("TIL File: {}x{} tiles", self.width(), self.height())
	}
}

impl Inspect for LitFile {
	fn summary(&self) -> String {
		format!("LIT File: {} objects, {} lightmaps", self.objects.len(), self.files.len())
	}
}

impl Inspect for TsiFile {
	fn summary(&self) -> String {
		format!("TSI File: {} textures, {} sprites", self.textures.len(), self.sprite_count())
	}
}

impl Inspect for ZmdFile {
	fn summary(&self) -> String {
		match self.validate_hierarchy() {
			Ok(()) => self.to_string(),
			Err(err) => format!("{self}\n  warning: {err}"),
		}
	}
}

impl Inspect for TblFile {
	fn summary(&self) -> String {
		format!("TBL File: {} rows", self.row_count())
	}
}

impl Inspect for LodFile {
	fn summary(&self) -> String {
		format!("LOD File '{}': {} levels", self.name, self.levels.len())
	}
}

impl Inspect for MovFile {
	fn summary(&self) -> String {
		let blocked = self.cells().iter().filter(|&&c| c != 0).count();
		format!("MOV File: {}x{} cells, {} blocked", self.width(), self.height(), blocked)
	}
}

impl Inspect for HlpFile {
	fn summary(&self) -> String {
		format!("HLP File: {} topics, {} pages", self.root.node_count(), self.pages.len())
	}
}

impl Inspect for ZcaFile {
	fn summary(&self) -> String {
		format!("ZCA File: {:?}, eye {:?}, fov {}", self.projection_type, self.eye, self.field_of_view)
	}
}

impl Inspect for StlFile {
	fn summary(&self) -> String {
		self.to_string()
	}
}

impl Inspect for PtlFile {
	fn summary(&self) -> String {
		let mut text = format!("PTL File: {} sequences", self.sequences.len());
		for sequence in &self.sequences {
			text.push_str(&format!("\n  '{}': {} events", sequence.name, sequence.events.len()));
		}
		text
	}
}

impl Inspect for ChrFile {
	fn summary(&self) -> String {
		format!(
			"CHR File: {}/{} characters enabled, {} skeletons, {} motions, {} effects",
			self.enabled_count(),
			self.characters.len(),
			self.skeleton_files.len(),
			self.motion_files.len(),
			self.effect_files.len()
		)
	}
}

/// Calls `$func::<T>($args)` with `T` chosen by `$file_type`.
macro_rules! dispatch {
	($file_type:expr, $func:ident($($arg:expr),*)) => {
		match $file_type {
			FileType::Zmo => $func::<ZmoFile>($($arg),*),
			FileType::Con => $func::<ConFile>($($arg),*),
			FileType::Idx => $func::<IdxFile>($($arg),*),
			FileType::Him => $func::<HimFile>($($arg),*),
			FileType::Til => $func::<TilFile>($($arg),*),
			FileType::Lit => $func::<LitFile>($($arg),*),
			FileType::Tsi => $func::<TsiFile>($($arg),*),
			FileType::Zmd => $func::<ZmdFile>($($arg),*),
			FileType::Tbl => $func::<TblFile>($($arg),*),
			FileType::Lod => $func::<LodFile>($($arg),*),
			FileType::Mov => $func::<MovFile>($($arg),*),
			FileType::Hlp => $func::<HlpFile>($($arg),*),
			FileType::Zca => $func::<ZcaFile>($($arg),*),
			FileType::Stl => $func::<StlFile>($($arg),*),
			FileType::Ptl => $func::<PtlFile>($($arg),*),
			FileType::Chr => $func::<ChrFile>($($arg),*),
		}
	};
}

fn detect(path: &Path) -> Result<FileType> {
	FileType::from_path(path).with_context(|| format!("Unrecognised file extension: {}", path.display()))
}

fn handle_info<F: Inspect>(path: &Path) -> Result<()> {
	let file = F::open(path).with_context(|| format!("Failed to load {}", path.display()))?;
	println!("{}", path.display());
	println!("{}", file.summary());
	Ok(())
}

fn handle_dump<F: Inspect>(path: &Path, pretty: bool) -> Result<()> {
	let file = F::open(path).with_context(|| format!("Failed to load {}", path.display()))?;
	let json = if pretty { serde_json::to_string_pretty(&file)? } else { serde_json::to_string(&file)? };
	println!("{json}");
	Ok(())
}

fn handle_roundtrip<F: Inspect>(path: &Path) -> Result<()> {
	let original = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
	let file = F::from_bytes(&original).with_context(|| format!("Failed to decode {}", path.display()))?;
	let encoded = file.to_bytes().context("Failed to encode")?;
	debug!("{}: {} bytes read, {} bytes written", F::FILE_TYPE, original.len(), encoded.len());

	let reloaded = F::from_bytes(&encoded).context("Failed to decode the re-encoded bytes")?;
	if reloaded != file {
		bail!("{} changed after a decode/encode cycle", path.display());
	}

	match original.iter().zip(&encoded).position(|(a, b)| a != b) {
		None if original.len() == encoded.len() => {
			println!("{}: identical ({} bytes)", path.display(), original.len());
		}
		None => {
			println!(
				"{}: same content, length differs ({} -> {} bytes)",
				path.display(),
				original.len(),
				encoded.len()
			);
		}
		Some(offset) => {
			println!(
				"{}: first difference at 0x{:X} ({:02X} -> {:02X})",
				path.display(),
				offset,
				original[offset],
				encoded[offset]
			);
		}
	}
	Ok(())
}

#[derive(Serialize)]
struct ListedEntry<'a> {
	system: &'a str,
	#[serde(flatten)]
	entry: &'a VfsFileEntry,
}

fn handle_vfs_list(
	path: &Path,
	system: Option<String>,
	filter: Option<String>,
	deleted: bool,
	format: OutputFormat,
	pretty: bool,
) -> Result<()> {
	let index = IdxFile::open(path).with_context(|| format!("Failed to load {}", path.display()))?;
	info!("{index}");

	let systems: Vec<&VfsFileSystem> = match &system {
		Some(name) => {
			vec![index.find_system(name).with_context(|| format!("No archive named {name} in {}", path.display()))?]
		}
		None => index.file_systems.iter().collect(),
	};
	let pattern = filter.as_deref().map(file::idx::normalize_path);

	let entries: Vec<ListedEntry<'_>> = systems
		.iter()
		.flat_map(|s| s.files.iter().map(move |entry| (s, entry)))
		.filter(|(_, entry)| deleted || !entry.is_deleted)
		.filter(|(_, entry)| pattern.as_ref().is_none_or(|p| file::idx::normalize_path(&entry.path).contains(p)))
		.map(|(s, entry)| ListedEntry {
			system: &s.filename,
			entry,
		})
		.collect();

	match format {
		OutputFormat::Json => {
			let json = if pretty { serde_json::to_string_pretty(&entries)? } else { serde_json::to_string(&entries)? };
			println!("{json}");
		}
		OutputFormat::Table => {
			println!("{:<12} {:>10} {:>10} {:>5} {}", "ARCHIVE", "OFFSET", "SIZE", "FLAGS", "PATH");
			for listed in &entries {
				let entry = listed.entry;
				let flags: String = [(entry.is_deleted, 'D'), (entry.is_compressed, 'C'), (entry.is_encrypted, 'E')]
					.iter()
					.map(|&(set, flag)| if set { flag } else { '-' })
					.collect();
				println!("{:<12} {:>10} {:>10} {:>5} {}", listed.system, entry.offset, entry.size, flags, entry.path);
			}
			println!("{} entries", entries.len());
		}
	}
	Ok(())
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	let settings = load_settings(cli.config.as_deref())?;
	env_logger::init_from_env(env_logger::Env::default().default_filter_or(settings.log_filter.as_str()));
	debug!("{settings:?}");

	match cli.command {
		Commands::Info {
			input,
		} => dispatch!(detect(&input)?, handle_info(&input)),
		Commands::Dump {
			input,
			compact,
		} => dispatch!(detect(&input)?, handle_dump(&input, settings.pretty && !compact)),
		Commands::Roundtrip {
			input,
		} => dispatch!(detect(&input)?, handle_roundtrip(&input)),
		Commands::VfsList {
			input,
			system,
			filter,
			deleted,
			format,
		} => handle_vfs_list(&input, system, filter, deleted, format, settings.pretty),
	}
}
