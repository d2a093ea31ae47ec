use catalogview::paginate::PageItem;
use catalogview::record::category_label;
use catalogview::{
    Catalog, CategoryFilter, Config, Dashboard, DateDeriver, DateRange, FavoritesStore, FilterState, HttpSource,
    KeyValueStore, Product, ViewModel, ViewStatus,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalogview")]
#[command(about = "CatalogView CLI - Browse a product catalog with search, filters and favorites")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the config file (default: <config dir>/catalogview/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the catalog API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Override the number of products per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Override the directory favorites are stored in
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, narrowed by search, category and date added
    List {
        /// Case-insensitive text to find in title or description
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category slug, or "all"
        #[arg(short, long, default_value = CategoryFilter::ALL)]
        category: String,

        /// First day of the date-added range (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the date-added range (YYYY-MM-DD); defaults to --from
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// List category slugs
    Categories,

    /// Show a single product
    Show { id: u64 },

    /// Add or remove a product from favorites
    Fav { id: u64 },

    /// List favorite products
    Favorites,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    config.validate()?;

    let source = HttpSource::new(&config.api_base_url, config.request_timeout())?;
    let favorites = FavoritesStore::open(config.open_storage()?);
    let mut dashboard = Dashboard::new(Catalog::new(DateDeriver::today()), config.page_size, favorites);

    match cli.command {
        Commands::List {
            search,
            category,
            from,
            to,
            page,
        } => {
            let date_range = match (from, to) {
                (Some(from), to) => Some(DateRange::new(from, to)),
                (None, Some(_)) => return Err(eyre!("--to requires --from")),
                (None, None) => None,
            };

            dashboard.load(&source);
            dashboard.set_filter_state(FilterState {
                search_query: search,
                category: CategoryFilter::parse(&category),
                date_range,
            });
            dashboard.set_current_page(page);

            render_list(&dashboard.view(), &dashboard)?;
        }
        Commands::Categories => {
            dashboard.load(&source);
            if let Some(e) = dashboard.load_error() {
                return Err(eyre!("Failed to load categories: {}", e));
            }
            for slug in dashboard.categories() {
                println!("{:<24} {}", slug, category_label(&slug).dimmed());
            }
        }
        Commands::Show { id } => {
            let product = dashboard.catalog().fetch_product(&source, id)?;
            render_detail(&product, dashboard.is_favorite(id));
        }
        Commands::Fav { id } => {
            if dashboard.toggle_favorite(id) {
                println!("{} Added {} to favorites", "★".yellow(), id);
            } else {
                println!("{} Removed {} from favorites", "☆".dimmed(), id);
            }
        }
        Commands::Favorites => {
            let ids = dashboard.favorites().ids();
            if ids.is_empty() {
                println!("No favorites yet");
                return Ok(());
            }

            dashboard.load(&source);
            if let Some(e) = dashboard.load_error() {
                return Err(eyre!("Failed to load products: {}", e));
            }
            let products = dashboard.favorite_products();
            for id in ids {
                match products.iter().find(|p| p.id == id) {
                    Some(product) => println!("{} {:>4}  {}", "★".yellow(), id, product.title.bold()),
                    None => println!("{} {:>4}  {}", "★".yellow(), id, "(not in catalog)".dimmed()),
                }
            }
        }
    }

    Ok(())
}

fn render_list<S: KeyValueStore>(view: &ViewModel, dashboard: &Dashboard<S>) -> Result<()> {
    match &view.status {
        ViewStatus::Loading => {
            println!("Loading products...");
            return Ok(());
        }
        ViewStatus::Failed(e) => {
            return Err(eyre!("Failed to load products. Please try again. ({})", e));
        }
        ViewStatus::NoResults => {
            println!("{}", "No products found matching your criteria.".yellow());
            if view.filter.is_active() {
                println!("{}", "Clear the search, category and date filters to see everything.".dimmed());
            }
            return Ok(());
        }
        ViewStatus::Results => {}
    }

    let mut header = view.summary();
    if let Some(range) = &view.filter.date_range {
        header.push_str(&format!("  (filtering by date: {})", range.label()));
    }
    println!("{}\n", header.dimmed());

    for product in &view.records {
        let star = if dashboard.is_favorite(product.id) {
            "★".yellow()
        } else {
            " ".normal()
        };
        println!(
            "{} {:>4}  {:<40} {:<18} {:>9} {:>5} {}",
            star,
            product.id,
            truncate(&product.title, 40).bold(),
            category_label(&product.category),
            format!("${:.2}", product.price).green(),
            format!("{:.1}", product.rating),
            format_date(product.date_added).dimmed(),
        );
    }

    if view.records.is_empty() {
        println!("{}", format!("Page {} is past the end of the results.", view.current_page).yellow());
    }

    if view.show_pagination() {
        println!("\n{}", render_window(&view.page_window, view.current_page));
    }

    Ok(())
}

fn render_window(window: &[PageItem], current: usize) -> String {
    window
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current => format!("[{}]", n).bold().to_string(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_detail(product: &Product, favorite: bool) {
    let star = if favorite { "★".yellow() } else { "☆".dimmed() };
    println!("{} {}", star, product.title.bold());
    println!("{}", product.description);
    println!();
    println!("  {:<10} {}", "Brand".dimmed(), product.brand);
    println!("  {:<10} {}", "Category".dimmed(), category_label(&product.category));
    if product.discount_percentage > 0.0 {
        println!(
            "  {:<10} {} {} (-{:.0}%)",
            "Price".dimmed(),
            format!("${:.2}", product.price).green(),
            format!("${:.2}", product.original_price()).strikethrough(),
            product.discount_percentage
        );
    } else {
        println!("  {:<10} {}", "Price".dimmed(), format!("${:.2}", product.price).green());
    }
    println!("  {:<10} {:.2} / 5", "Rating".dimmed(), product.rating);
    println!("  {:<10} {}", "Stock".dimmed(), product.stock);
    println!("  {:<10} {}", "Added".dimmed(), format_date(product.date_added));
    for image in &product.images {
        println!("  {:<10} {}", "Image".dimmed(), image);
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string()).unwrap_or_default()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
