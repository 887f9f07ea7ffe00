//! modgen - Module scaffolding for devscripts
//!
//! Generate a module's files from a built-in or custom template.
//!
//! Commands:
//! - new <NAME>: Generate a module
//! - list: List available templates
//! - show <TEMPLATE>: Show the files a template produces

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devscripts_core::{format, Config, Paths};
use modgen::builtin::DEFAULT_TEMPLATE;
use modgen::naming::generator_name;
use modgen::template::entry_placeholders;
use modgen::{register, GenerationRequest, ModuleHooks, TemplateRegistry};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modgen")]
#[command(about = "Module scaffolding - generate modules from templates")]
#[command(version)]
#[command(after_help = r#"BUILT-IN TEMPLATES:
    express-mongoose-zod    Express routes, controllers, services, Mongoose model, Zod validation

CUSTOM TEMPLATES:
    Defined under module.custom_templates in devscripts.config.json.
    File paths and contents may use placeholders:
    {{NAME}} {{PASCAL_NAME}} {{CAMEL_NAME}} {{KEBAB_NAME}} {{SNAKE_NAME}}
    {{CAPITALIZED_NAME}} {{PLURAL_NAME}} {{DATE}} {{YEAR}}

EXAMPLES:
    modgen new user                          # Default template into src/app/modules/user
    modgen new order -t my-template -d src/features
    modgen new user --force                  # Overwrite an existing module
    modgen new user --register               # Also add to COLLECTIONS and routes
    modgen list                              # Show all templates
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a module from a template
    New {
        /// Module name
        name: String,

        /// Template name (default: from config, then express-mongoose-zod)
        #[arg(short, long)]
        template: Option<String>,

        /// Destination directory
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Overwrite an existing module
        #[arg(short, long)]
        force: bool,

        /// Write files directly into the destination
        #[arg(long)]
        no_folder: bool,

        /// Register the module in COLLECTIONS and the routes array
        #[arg(long)]
        register: bool,

        /// Import routes through the `@/` alias when registering
        #[arg(long, requires = "register")]
        alias: bool,
    },

    /// List available templates
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the files a template produces
    Show {
        /// Template name
        template: String,

        /// Module name used to render the template
        #[arg(long, default_value = "example")]
        name: String,
    },
}

struct Project {
    paths: Paths,
    config: Config,
    registry: TemplateRegistry,
}

impl Project {
    fn load() -> Result<Self> {
        let paths = Paths::new().context("Failed to determine current directory")?;
        let (config, loaded) = Config::discover(&paths)?;
        if let Some(path) = loaded {
            tracing::debug!(config = %path.display(), "using config");
        }
        let registry = TemplateRegistry::from_config(&config.module);

        Ok(Self {
            paths,
            config,
            registry,
        })
    }
}

/// Progress messages printed around generation
struct ConsoleHooks;

impl ModuleHooks for ConsoleHooks {
    fn on_generate(&self, module_name: &str) {
        println!("info: Generating: {}", module_name);
    }

    fn on_complete(&self, module_name: &str) {
        println!("success: Complete: {}", module_name);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project = Project::load()?;

    match cli.command {
        Some(Commands::New {
            name,
            template,
            destination,
            force,
            no_folder,
            register,
            alias,
        }) => cmd_new(
            &project,
            &name,
            template.as_deref(),
            destination.as_deref(),
            force,
            no_folder,
            register.then_some(alias),
        ),

        Some(Commands::List { json }) => cmd_list(&project, json),

        Some(Commands::Show { template, name }) => cmd_show(&project, &template, &name),

        None => cmd_list(&project, false),
    }
}

/// Generate a module.
///
/// `registration` is `Some(use_alias)` when the module should be
/// registered with the app afterwards.
fn cmd_new(
    project: &Project,
    module_name: &str,
    template: Option<&str>,
    destination: Option<&Path>,
    force: bool,
    no_folder: bool,
    registration: Option<bool>,
) -> Result<()> {
    let module_config = &project.config.module;
    let template_name = template
        .or(module_config.template.as_deref())
        .unwrap_or(DEFAULT_TEMPLATE);

    let spec = project.registry.resolve(template_name)?;

    // Command line, then template, then config
    let destination = destination
        .map(Path::to_path_buf)
        .or_else(|| spec.destination.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(&module_config.destination));

    let create_subfolder = !no_folder
        && spec
            .create_folder
            .or(module_config.create_folder)
            .unwrap_or(true);

    let request = GenerationRequest::new(module_name, project.paths.resolve(&destination))
        .create_subfolder(create_subfolder)
        .overwrite(force || module_config.force);

    let start = Instant::now();
    let module = modgen::generate_module(&request, &spec.template, &ConsoleHooks)
        .with_context(|| format!("Failed to generate module from template: {}", spec.name))?;

    for file in &module.files {
        let shown = file.strip_prefix(&project.paths.root).unwrap_or(file);
        println!("  {}", shown.display());
    }
    println!(
        "success: Module \"{}\" generated with {} in {}",
        module_name,
        format::count(module.files.len(), "file"),
        format::duration(start.elapsed())
    );

    if let Some(use_alias) = registration {
        let root = &project.paths.root;
        if register::update_collection(root, module_name)? {
            println!("success: Added to COLLECTIONS: {}", register::COLLECTIONS_FILE);
        }
        if register::update_routes(root, module_name, use_alias)? {
            println!("success: Route registered: {}", register::ROUTES_FILE);
        }
    }

    Ok(())
}

/// List all available templates
fn cmd_list(project: &Project, json: bool) -> Result<()> {
    let templates: Vec<_> = project.registry.list().collect();

    if json {
        let json_output: Vec<_> = templates
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "builtin": t.is_builtin(),
                    "description": t.description,
                    "destination": t.destination,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    println!("\x1b[1mAvailable Templates\x1b[0m");
    println!();

    let builtin: Vec<_> = templates.iter().filter(|t| t.is_builtin()).collect();
    let custom: Vec<_> = templates.iter().filter(|t| !t.is_builtin()).collect();

    if !builtin.is_empty() {
        println!("\x1b[36mBuilt-in:\x1b[0m");
        for t in &builtin {
            println!("  \x1b[32m{}\x1b[0m", t.name);
            println!("    \x1b[2m{}\x1b[0m", format::truncate(&t.description, 72));
        }
        println!();
    }

    if custom.is_empty() {
        println!("\x1b[2mNo custom templates. Add them under module.custom_templates in devscripts.config.json\x1b[0m");
    } else {
        println!("\x1b[36mCustom:\x1b[0m");
        for t in &custom {
            println!("  \x1b[32m{}\x1b[0m", t.name);
            if !t.description.is_empty() {
                println!("    \x1b[2m{}\x1b[0m", format::truncate(&t.description, 72));
            }
        }
    }

    Ok(())
}

/// Show details about a template
fn cmd_show(project: &Project, template_name: &str, module_name: &str) -> Result<()> {
    let spec = project.registry.resolve(template_name)?;

    println!("\x1b[1mTemplate: {}\x1b[0m", spec.name);
    if spec.is_builtin() {
        println!("\x1b[2mBuilt-in generator: {}\x1b[0m", generator_name(&spec.name));
    } else {
        println!("\x1b[2mCustom template\x1b[0m");
    }
    if let Some(ref dest) = spec.destination {
        println!("\x1b[2mDestination: {}\x1b[0m", dest);
    }
    println!();

    if let Some(custom) = project.config.module.custom_templates.get(&spec.name) {
        let vars = entry_placeholders(&custom.files);
        println!("\x1b[36mPlaceholders:\x1b[0m");
        if vars.is_empty() {
            println!("  (none, static template)");
        } else {
            for var in &vars {
                println!("  {{{{{}}}}}", var);
            }
        }
        println!();
    }

    println!("\x1b[36mFiles for \"{}\":\x1b[0m", module_name);
    let mut files = spec.template.files(module_name);
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let count = files.len();
    for (i, file) in files.iter().enumerate() {
        let connector = if i + 1 == count { "--- " } else { "|-- " };
        println!(
            "{}{} \x1b[2m({})\x1b[0m",
            connector,
            file.path,
            format::count(file.content.lines().count(), "line")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_new_arguments() {
        let cli = Cli::try_parse_from(["modgen", "new", "user", "-t", "feature", "--no-folder", "-f"]).unwrap();
        match cli.command {
            Some(Commands::New {
                name,
                template,
                force,
                no_folder,
                register,
                ..
            }) => {
                assert_eq!(name, "user");
                assert_eq!(template.as_deref(), Some("feature"));
                assert!(force && no_folder && !register);
            }
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn test_alias_requires_register() {
        assert!(Cli::try_parse_from(["modgen", "new", "user", "--alias"]).is_err());
    }
}
