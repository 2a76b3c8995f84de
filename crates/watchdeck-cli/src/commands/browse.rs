use clap::ValueEnum;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use watchdeck_config::PathManager;
use watchdeck_core::FetchSlice;
use watchdeck_models::CatalogItem;
use watchdeck_remote::{CatalogClient, RemoteError};

use crate::commands::{load_config, spinner, MediaKind};
use crate::output::{Output, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Rail {
    /// Today's trending movies and shows
    Trending,
    /// Top-rated movies
    TopMovies,
    /// Top-rated TV shows
    TopTv,
    /// Popular animated movies
    Animation,
}

impl Rail {
    fn label(&self) -> &'static str {
        match self {
            Rail::Trending => "Fetching trending titles",
            Rail::TopMovies => "Fetching top-rated movies",
            Rail::TopTv => "Fetching top-rated TV shows",
            Rail::Animation => "Fetching animated movies",
        }
    }
}

fn build_catalog() -> Result<CatalogClient> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    Ok(CatalogClient::new(&config.catalog)?)
}

async fn load_rail(catalog: &CatalogClient, rail: Rail) -> Result<Vec<CatalogItem>, RemoteError> {
    match rail {
        Rail::Trending => catalog.trending().await,
        Rail::TopMovies => Ok(catalog
            .top_rated_movies()
            .await?
            .into_iter()
            .map(CatalogItem::Movie)
            .collect()),
        Rail::TopTv => Ok(catalog
            .top_rated_tv()
            .await?
            .into_iter()
            .map(CatalogItem::Tv)
            .collect()),
        Rail::Animation => Ok(catalog
            .top_animation()
            .await?
            .into_iter()
            .map(CatalogItem::Movie)
            .collect()),
    }
}

pub async fn run_browse(rail: Rail, output: &Output) -> Result<()> {
    let catalog = build_catalog()?;

    let mut slice = FetchSlice::new();
    let pb = spinner(output, rail.label());
    let ok = slice.load(load_rail(&catalog, rail)).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if !ok {
        return Err(eyre!(
            "Catalog request failed: {}",
            slice.error().unwrap_or("unknown error")
        ));
    }

    render_items(&slice.into_data().unwrap_or_default(), output)
}

pub async fn run_search(query: &str, output: &Output) -> Result<()> {
    let catalog = build_catalog()?;

    let mut slice = FetchSlice::new();
    let pb = spinner(output, "Searching");
    let ok = slice.load(catalog.search(query)).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if !ok {
        return Err(eyre!(
            "Search failed: {}",
            slice.error().unwrap_or("unknown error")
        ));
    }

    let items = slice.into_data().unwrap_or_default();
    if items.is_empty() {
        output.info(format!("No results for \"{}\"", query));
        return Ok(());
    }
    render_items(&items, output)
}

fn render_items(items: &[CatalogItem], output: &Output) -> Result<()> {
    match output.format() {
        OutputFormat::Human => {
            if items.is_empty() {
                output.info("Nothing to show");
                return Ok(());
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_header(vec!["Type", "ID", "Title", "Year", "Rating"]);
            for item in items {
                table.add_row(vec![
                    item.media_type().to_string(),
                    item.media_id(),
                    item.title().to_string(),
                    item.year().map(|y| y.to_string()).unwrap_or_default(),
                    item.vote_average()
                        .map(|v| format!("{:.1}", v))
                        .unwrap_or_default(),
                ]);
            }
            output.println(table.to_string());
        }
        _ => {
            output.json(&serde_json::to_value(items)?);
        }
    }
    Ok(())
}

pub async fn run_details(kind: MediaKind, id: u64, output: &Output) -> Result<()> {
    let catalog = build_catalog()?;
    let pb = spinner(output, "Fetching details");

    match kind {
        MediaKind::Movie => {
            let mut slice = FetchSlice::new();
            let ok = slice.load(catalog.movie_details(id)).await;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            if !ok {
                return Err(eyre!(
                    "Details request failed: {}",
                    slice.error().unwrap_or("unknown error")
                ));
            }
            let Some(movie) = slice.into_data() else {
                return Err(eyre!("Details request returned no data"));
            };

            match output.format() {
                OutputFormat::Human => {
                    output.println(format!("{} ({})", movie.title, year_of(&movie.release_date)));
                    if let Some(ref tagline) = movie.tagline {
                        if !tagline.is_empty() {
                            output.println(format!("  \"{}\"", tagline));
                        }
                    }
                    if let Some(runtime) = movie.runtime {
                        output.println(format!("  Runtime: {} min", runtime));
                    }
                    if !movie.genres.is_empty() {
                        let names: Vec<&str> =
                            movie.genres.iter().map(|g| g.name.as_str()).collect();
                        output.println(format!("  Genres: {}", names.join(", ")));
                    }
                    if let Some(rating) = movie.vote_average {
                        output.println(format!("  Rating: {:.1}/10", rating));
                    }
                    if let Some(ref overview) = movie.overview {
                        output.println(format!("\n{}", overview));
                    }
                }
                _ => output.json(&serde_json::to_value(&movie)?),
            }
        }
        MediaKind::Tv => {
            let mut slice = FetchSlice::new();
            let ok = slice.load(catalog.tv_details(id)).await;
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            if !ok {
                return Err(eyre!(
                    "Details request failed: {}",
                    slice.error().unwrap_or("unknown error")
                ));
            }
            let Some(show) = slice.into_data() else {
                return Err(eyre!("Details request returned no data"));
            };

            match output.format() {
                OutputFormat::Human => {
                    output.println(format!("{} ({})", show.name, year_of(&show.first_air_date)));
                    if let (Some(seasons), Some(episodes)) =
                        (show.number_of_seasons, show.number_of_episodes)
                    {
                        output.println(format!("  {} seasons, {} episodes", seasons, episodes));
                    }
                    if !show.genres.is_empty() {
                        let names: Vec<&str> =
                            show.genres.iter().map(|g| g.name.as_str()).collect();
                        output.println(format!("  Genres: {}", names.join(", ")));
                    }
                    if let Some(rating) = show.vote_average {
                        output.println(format!("  Rating: {:.1}/10", rating));
                    }
                    if let Some(ref overview) = show.overview {
                        output.println(format!("\n{}", overview));
                    }
                }
                _ => output.json(&serde_json::to_value(&show)?),
            }
        }
    }
    Ok(())
}

fn year_of(date: &Option<String>) -> String {
    date.as_deref()
        .and_then(|d| d.get(..4))
        .unwrap_or("-")
        .to_string()
}
