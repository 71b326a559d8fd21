//! VEC3 CLI - Tool for inspecting and re-encoding VEC3 containers.

use std::env;
use std::path::Path;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vec3::model::{load_from_path, write_to_path, Body, Mesh, VertexAttribute};

/// Verbosity selected by global flags.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins unless a flag was given.
fn init_logging(verbosity: Option<Verbosity>) {
    let filter = match verbosity {
        Some(v) => EnvFilter::new(v.directive()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Verbosity::Info.directive())),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbosity = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Some(Verbosity::Debug),
            "-vv" | "--trace" => verbosity = Some(Verbosity::Trace),
            "-q" | "--quiet" => verbosity = Some(Verbosity::Quiet),
            _ => filtered_args.push(arg),
        }
    }

    let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
    if json_mode {
        verbosity = Some(Verbosity::Quiet);
    }
    init_logging(verbosity);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - show container summary
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: vec3-cli info <file.vec3>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1]);
        }

        // Dump command - per-model, per-mesh details
        "dump" | "d" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: vec3-cli dump <file.vec3> [--json]");
                std::process::exit(1);
            }
            cmd_dump(filtered_args[1], json_mode);
        }

        // Copy command - decode and re-encode
        "copy" | "c" => {
            let paths: Vec<&str> = filtered_args[1..].iter().copied().filter(|s| !s.starts_with("--")).collect();
            if paths.len() < 2 {
                eprintln!("Error: missing arguments");
                eprintln!("Usage: vec3-cli copy <input.vec3> <output.vec3> [--gzip|--raw]");
                std::process::exit(1);
            }
            let gzip = if filtered_args.contains(&"--gzip") {
                Some(true)
            } else if filtered_args.contains(&"--raw") {
                Some(false)
            } else {
                None
            };
            cmd_copy(paths[0], paths[1], gzip);
        }

        "version" | "--version" | "-V" => {
            println!("vec3-cli {} (built {})", env!("CARGO_PKG_VERSION"), env!("VEC3_BUILD_DATE"));
        }

        // Help
        "help" | "h" | "-h" | "--help" => print_help(),

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0]);
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("vec3-cli - VEC3 model container toolkit");
    println!();
    println!("USAGE:");
    println!("    vec3-cli [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file>                    Show material, model and mesh counts");
    println!("    d, dump   <file> [--json]           Show every model and mesh");
    println!("    c, copy   <in> <out> [--gzip|--raw] Re-encode, optionally changing compression");
    println!("    version                             Show version and build date");
    println!("    h, help                             Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!();
    println!("EXAMPLES:");
    println!("    vec3-cli info level.vec3                # Quick overview");
    println!("    vec3-cli dump level.vec3 --json         # Full layout as JSON");
    println!("    vec3-cli copy in.vec3 out.vec3 --gzip   # Compress every block");
    println!("    vec3-cli -v info large.vec3             # Verbose info");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG is honored when no verbosity flag is given");
}

fn open(path: &str) -> Body {
    info!("Opening container: {}", path);
    match load_from_path(path) {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &str) {
    let body = open(path);
    debug!("Container decoded successfully");

    let triangles: usize = body.models.iter().map(|m| m.triangle_count()).sum();
    let compressed = body
        .models
        .iter()
        .flat_map(|m| &m.meshes)
        .filter(|mesh| mesh.flags.contains(vec3::model::MeshFlags::GZIP))
        .count();

    println!("Container: {}", path);
    println!("Materials: {}", body.materials.len());
    println!("Models:    {}", body.models.len());
    println!("Meshes:    {} ({} gzipped)", body.mesh_count(), compressed);
    println!("Triangles: {}", triangles);

    if let Err(e) = body.validate() {
        println!();
        println!("Warning: {}", e);
    }
}

fn attribute_summary(attribute: &VertexAttribute) -> String {
    format!(
        "{} x{}{}",
        attribute.ty,
        attribute.row_count(),
        if attribute.is_compressed() { " (gzip)" } else { "" }
    )
}

fn mesh_json(mesh: &Mesh) -> serde_json::Value {
    let attributes: Vec<serde_json::Value> = mesh
        .attributes
        .iter()
        .map(|a| {
            serde_json::json!({
                "type": a.ty.name(),
                "rows": a.row_count(),
                "gzip": a.is_compressed(),
            })
        })
        .collect();
    serde_json::json!({
        "material_id": mesh.material_id,
        "triangles": mesh.triangle_count(),
        "index_width": mesh.index_width(),
        "gzip": mesh.flags.contains(vec3::model::MeshFlags::GZIP),
        "attributes": attributes,
    })
}

fn cmd_dump(path: &str, json_mode: bool) {
    let body = open(path);

    if json_mode {
        let materials: Vec<serde_json::Value> = body
            .materials
            .iter()
            .map(|m| serde_json::json!({ "name": m.name, "shadeless": m.is_shadeless() }))
            .collect();
        let models: Vec<serde_json::Value> = body
            .models
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.name,
                    "origin": m.origin,
                    "meshes": m.meshes.iter().map(mesh_json).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "container": path,
                "materials": materials,
                "models": models,
            }))
            .unwrap_or_default()
        );
        return;
    }

    println!("Container: {}", path);
    println!();
    println!("Materials:");
    for (i, material) in body.materials.iter().enumerate() {
        println!("  [{}] {}{}", i, material.name, if material.is_shadeless() { " (shadeless)" } else { "" });
    }
    println!();
    println!("Models:");
    for model in &body.models {
        println!(
            "  {} origin=({:.3}, {:.3}, {:.3}) triangles={}",
            model.name,
            model.origin[0],
            model.origin[1],
            model.origin[2],
            model.triangle_count()
        );
        for (i, mesh) in model.meshes.iter().enumerate() {
            let material = body.materials.get(mesh.material_id as usize).map_or("<missing>", |m| m.name.as_str());
            let attributes: Vec<String> = mesh.attributes.iter().map(attribute_summary).collect();
            println!(
                "    mesh {}: material={} ({}) triangles={} index_width={} [{}]",
                i,
                mesh.material_id,
                material,
                mesh.triangle_count(),
                mesh.index_width(),
                attributes.join(", ")
            );
        }
    }
}

fn cmd_copy(input: &str, output: &str, gzip: Option<bool>) {
    info!("Copying {} -> {}", input, output);

    let body = open(input);
    let body = match gzip {
        Some(gzip) => body.with_compression(gzip),
        None => body,
    };

    if let Err(e) = write_to_path(output, &body) {
        eprintln!("Failed to write {}: {}", output, e);
        std::process::exit(1);
    }

    println!("Copied {} -> {}", input, output);
}
