use clap::{ArgAction, Parser, Subcommand};
use gradus_store::DEFAULT_STORE_DIR;

#[derive(Parser)]
#[command(
    name = "gradus",
    about = "Gradus: record leveled knowledge points and compose them into recipes",
    version
)]
pub struct Cli {
    /// Store directory holding knowledge.jsonl and recipes.jsonl
    #[arg(long, global = true, env = "GRADUS_STORE", default_value = DEFAULT_STORE_DIR)]
    pub store: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize an empty store directory
    Init {
        /// Store directory to create (defaults to --store)
        path: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the level scale, coarsest first
    Levels {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage knowledge points
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommands,
    },

    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },

    /// Preview whether one knowledge point may be cited at a level
    Resolve {
        /// Knowledge point ID
        id: String,

        /// Target level: collection, work, section, motif or timbre
        #[arg(long)]
        level: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a reference set at a level without storing anything
    Validate {
        /// Target level
        #[arg(long)]
        level: String,

        /// Knowledge point IDs, in citation order
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-validate every stored recipe against current knowledge
    Audit {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum KnowledgeCommands {
    /// Add a knowledge point
    Add {
        /// Level the point is authored at
        #[arg(long)]
        level: String,

        /// Category at that level: form or material
        #[arg(long)]
        category: String,

        /// Statement text
        #[arg(long)]
        content: String,

        /// Optional provenance note
        #[arg(long)]
        source: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List knowledge points with optional filters
    List {
        /// Filter by level
        #[arg(long)]
        level: Option<String>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one knowledge point and the levels it is usable at
    Show {
        /// Knowledge point ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a knowledge point
    Remove {
        /// Knowledge point ID
        id: String,

        /// Remove even if recipes still cite it
        #[arg(long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum RecipeCommands {
    /// Add a recipe after validating its references
    Add {
        /// Recipe level
        #[arg(long)]
        level: String,

        /// Cited knowledge point ID (repeatable, order kept)
        #[arg(long = "knowledge", required = true)]
        knowledge: Vec<String>,

        /// How the cited points are combined
        #[arg(long)]
        procedure: String,

        /// What the recipe produces
        #[arg(long)]
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a recipe; level or reference changes are re-validated
    Update {
        /// Recipe ID
        id: String,

        /// New recipe level
        #[arg(long)]
        level: Option<String>,

        /// Replacement reference list (repeatable)
        #[arg(long = "knowledge")]
        knowledge: Vec<String>,

        /// New procedure text
        #[arg(long)]
        procedure: Option<String>,

        /// New description text
        #[arg(long)]
        description: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recipes with optional filters
    List {
        /// Filter by level
        #[arg(long)]
        level: Option<String>,

        /// Only recipes citing this knowledge point ID
        #[arg(long)]
        uses: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one recipe with the role each reference plays
    Show {
        /// Recipe ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a recipe
    Remove {
        /// Recipe ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
