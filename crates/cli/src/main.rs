use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{CategoryUniverse, DataIndex, UserId};
use feedback::{
    Action, FeedbackSession, LearningAgent, LinearQAgent, PreferenceSummary, UpdateResult, DEFAULT_EPISODES,
};
use pipeline::StateEncoder;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use server::{HybridOrchestrator, HybridReport};
use sources::ScoredItem;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// restaurant-recs - Hybrid Restaurant Recommendation Engine
#[derive(Parser)]
#[command(name = "restaurant-recs")]
#[command(about = "Restaurant recommendations from content-based and collaborative scoring", long_about = None)]
struct Cli {
    /// Directory holding restaurants.json and users.json
    #[arg(short, long, env = "RESTAURANT_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get hybrid recommendations for a user
    Recommend {
        /// User ID to get recommendations for (random user if omitted)
        #[arg(long)]
        user_id: Option<UserId>,

        /// Number of recommendations to print
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Place ids held out as relevant; enables evaluation
        #[arg(long, num_args = 1..)]
        relevant: Vec<String>,

        /// Cutoff for precision@k and recall@k
        #[arg(long, default_value = "10")]
        k: usize,

        /// Directory for the JSON output
        #[arg(long, default_value = pipeline::DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Remote rating model (e.g. http://localhost:50051)
        #[arg(long, env = "RATING_MODEL_ADDR")]
        ml_addr: Option<String>,
    },

    /// Interactive feedback session over a user's hybrid recommendations
    Feedback {
        /// User ID whose recommendations are shown (random user if omitted)
        #[arg(long)]
        user_id: Option<UserId>,

        /// Number of items to ask about
        #[arg(long, default_value_t = DEFAULT_EPISODES)]
        episodes: usize,

        /// Seed for reproducible sessions
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show a user's profile and ratings
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search for restaurants by name
    Search {
        /// Name to search for (case-insensitive substring match)
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading restaurant data from {}...", cli.data_dir.display());
    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&cli.data_dir).context("Failed to load restaurant data")?,
    );
    let (restaurants, users, ratings) = data_index.counts();
    println!(
        "{} Loaded {} restaurants, {} users, {} ratings in {:?}",
        "✓".green(),
        restaurants,
        users,
        ratings,
        start.elapsed()
    );

    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            relevant,
            k,
            output_dir,
            ml_addr,
        } => handle_recommend(data_index, user_id, limit, relevant, k, output_dir, ml_addr).await?,
        Commands::Feedback {
            user_id,
            episodes,
            seed,
        } => handle_feedback(data_index, user_id, episodes, seed).await?,
        Commands::User { user_id } => handle_user(&data_index, &user_id)?,
        Commands::Search { name } => handle_search(&data_index, &name),
    }

    Ok(())
}

/// Use the given user, or pick one at random
fn resolve_user(data_index: &DataIndex, user_id: Option<UserId>, rng: &mut StdRng) -> Result<UserId> {
    if let Some(user_id) = user_id {
        data_index
            .get_user(&user_id)
            .ok_or_else(|| anyhow!("User {} not found", user_id))?;
        return Ok(user_id);
    }
    let user_id = data_index
        .user_ids()
        .choose(rng)
        .cloned()
        .ok_or_else(|| anyhow!("No users in dataset"))?;
    println!("{} Picked random user {}", "•".cyan(), user_id.bold());
    Ok(user_id)
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Handle the 'recommend' command
#[allow(clippy::too_many_arguments)]
async fn handle_recommend(
    data_index: Arc<DataIndex>,
    user_id: Option<UserId>,
    limit: usize,
    relevant: Vec<String>,
    k: usize,
    output_dir: PathBuf,
    ml_addr: Option<String>,
) -> Result<()> {
    let user_id = resolve_user(&data_index, user_id, &mut rng_from(None))?;

    let mut orchestrator = HybridOrchestrator::new(data_index).with_output_dir(Some(output_dir));
    if let Some(addr) = ml_addr {
        orchestrator = orchestrator
            .connect_ml(addr)
            .await
            .context("Failed to connect to rating model")?;
    }

    let report = orchestrator.recommend(&user_id, Some(limit)).await?;
    print_recommendations(&report);

    if !relevant.is_empty() {
        let relevant: HashSet<String> = relevant.into_iter().collect();
        let metrics = report.evaluate(&relevant, k)?;
        println!("\n{}", "Evaluation".bold().blue());
        println!("{}", metrics);
    }
    Ok(())
}

/// Handle the 'feedback' command
async fn handle_feedback(
    data_index: Arc<DataIndex>,
    user_id: Option<UserId>,
    episodes: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = rng_from(seed);
    let user_id = resolve_user(&data_index, user_id, &mut rng)?;

    let report = HybridOrchestrator::new(data_index)
        .recommend(&user_id, None)
        .await?;
    if report.items.is_empty() {
        println!("No recommendations for user {}; nothing to ask about.", user_id);
        return Ok(());
    }

    let universe = CategoryUniverse::default();
    let state_size = StateEncoder::new(universe.clone()).state_size();
    let mut agent = LinearQAgent::new(state_size, Action::ALL.len());
    if let Some(seed) = seed {
        agent = agent.with_seed(seed);
    }

    let mut session = FeedbackSession::new(report.items, universe, agent, rng)?.with_episode_budget(episodes);
    run_session(&mut session, io::stdin().lock())?;

    println!("\n{}", "User Preferences Summary".bold().blue());
    print!("{}", session.summary());
    println!(
        "\n{} Session complete: {} episodes, total reward {:.2}",
        "✓".green(),
        session.episodes_used(),
        session.total_reward()
    );
    Ok(())
}

/// Drive a session from line-oriented input until it ends or input runs out
fn run_session<A: LearningAgent, R: rand::Rng>(
    session: &mut FeedbackSession<A, R>,
    mut input: impl BufRead,
) -> Result<()> {
    loop {
        let Some(presented) = session.present_item() else {
            break;
        };
        print_item(presented.item);
        if let Some(predicted) = presented.predicted_action {
            println!("   Agent expects: {}", predicted.to_string().dimmed());
        }

        print!("Do you like this recommendation? (like/unlike/click/skip): ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line).context("Failed to read feedback")? == 0 {
            println!();
            return Ok(());
        }

        match session.submit_action(&line)? {
            UpdateResult::Applied { action, reward, .. } => {
                println!("   {} {} (reward {:.2})", "→".green(), action, reward);
                println!("   {}", running_summary(&session.summary()).dimmed());
            }
            UpdateResult::Rejected { .. } => println!("   {}", "Invalid input. Skipping.".yellow()),
        }
    }

    if session.episodes_used() < session.items().len() {
        println!("\nEpisode budget used up.");
    } else {
        println!("\nYou've seen all restaurants!");
    }
    Ok(())
}

/// One-line view of the learned preferences: top three categories and averages
fn running_summary(summary: &PreferenceSummary) -> String {
    let top = summary
        .top_categories(3)
        .iter()
        .map(|(category, value)| format!("{category} {value:+}"))
        .collect::<Vec<_>>()
        .join(", ");
    let avg = |v: Option<f32>| v.map_or("N/A".to_string(), |v| format!("{v:.2}"));
    format!(
        "Top: {} | Avg. Price Level: {} | Avg. Rating: {}",
        top,
        avg(summary.avg_price_level),
        avg(summary.avg_rating)
    )
}

fn print_item(item: &ScoredItem) {
    let name = item.name.as_deref().unwrap_or("Unknown");
    let categories = if item.categories.is_empty() {
        "Unknown".to_string()
    } else {
        item.categories.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let show = |v: Option<f32>| v.map_or("N/A".to_string(), |v| format!("{:.1}", v));

    println!("\n{} {}", "Recommendation:".bold(), name.bold());
    println!("   Categories: {}", categories);
    println!(
        "   Rating: {}, Price Level: {}, Score: {:.4}",
        show(item.attributes.rating),
        show(item.attributes.price_level),
        item.rank_score()
    );
}

/// Handle the 'user' command
fn handle_user(data_index: &DataIndex, user_id: &str) -> Result<()> {
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;
    let ratings = data_index.get_user_ratings(user_id);

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    if !user.preferences.is_empty() {
        println!("{}Preferences: {}", "• ".green(), user.preferences.join(", "));
    }

    let avg_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().map(|r| r.rating).sum::<f32>() / ratings.len() as f32
    };
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    let name_of = |place_id: &str| {
        data_index
            .get_restaurant(place_id)
            .map_or_else(|| format!("Unknown ({})", place_id), |r| r.name.clone())
    };

    println!("Favourite restaurants:");
    for place_id in &user.favourite_restaurants {
        println!("  - {}", name_of(place_id));
    }

    let mut top_rated: Vec<_> = ratings.iter().collect();
    top_rated.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    println!("Top rated restaurants:");
    for rating in top_rated.iter().take(5) {
        println!("  - {} (Rating: {})", name_of(&rating.place_id), rating.rating);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(data_index: &DataIndex, name: &str) {
    let needle = name.to_lowercase();

    // (exact match first, rating) per hit
    let mut matches: Vec<(usize, f32, &data_loader::Restaurant)> = data_index
        .restaurants()
        .filter_map(|r| {
            let haystack = r.name.to_lowercase();
            let relevance = if haystack == needle {
                0
            } else if haystack.contains(&needle) {
                1
            } else {
                return None;
            };
            Some((relevance, r.attributes.rating.unwrap_or(0.0), r))
        })
        .collect();
    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.total_cmp(&a.1)));

    println!("{}", format!("Search results for '{}':", name).bold().blue());
    for (_, rating, restaurant) in matches.iter().take(20) {
        println!(
            "{}: {} [{}] rating {:.1} ({} reviews)",
            restaurant.place_id,
            restaurant.name,
            restaurant.categories.join(", "),
            rating,
            restaurant.attributes.user_ratings_total.unwrap_or(0)
        );
    }
    if matches.is_empty() {
        println!("No restaurants match '{}'", name);
    }
}

/// Print the hybrid ranking
fn print_recommendations(report: &HybridReport) {
    println!(
        "\n{} (user {}, showing {} of {})",
        "Hybrid Recommendations".bold().blue(),
        report.user_id,
        report.items.len(),
        report.total_candidates
    );
    println!("{}", "-".repeat(50));
    for (rank, item) in report.items.iter().enumerate() {
        let categories = if item.categories.is_empty() {
            "N/A".to_string()
        } else {
            item.categories.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        println!("{}. {}", (rank + 1).to_string().green(), item.name.as_deref().unwrap_or("Unknown"));
        println!("   Categories: {}", categories);
        println!("   Score: {:.4}", item.rank_score());
        println!(
            "   Source: {}",
            item.source.map_or("Unknown".to_string(), |s| s.to_string())
        );
        println!("{}", "-".repeat(50));
    }
    if let Some(path) = &report.output_path {
        println!("{} Saved to {}", "✓".green(), path.display());
    }
}
