use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dashcharts::api::DEFAULT_BASE_URL;
use dashcharts::dashboard::{Panel, PanelView, build_panel, load_dashboard, standard_panels};
use dashcharts::percent::to_percentage_stack;
use dashcharts::posts::{PostCategory, PostFilters, SortBy, SortOrder};
use dashcharts::{Client, LegendStore, storage, viz};
use regex::Regex;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dashcharts",
    version,
    about = "Render the analytics dashboard charts and browse posts"
)]
struct Cli {
    /// Base URL of the REST service.
    #[arg(long, env = "DASHCHARTS_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,
    /// Bearer token sent with every request.
    #[arg(long, env = "DASHCHARTS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the dashboard data and write one SVG per chart.
    Render(RenderArgs),
    /// Print or save the normalized rows behind one chart.
    Rows(RowsArgs),
    /// List posts.
    Posts(PostsArgs),
    /// Log in and print the session token.
    Login(LoginArgs),
    /// Check that the service is up.
    Health,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Directory the SVG files are written to (created if missing).
    #[arg(long, default_value = "charts")]
    out_dir: PathBuf,
    /// Only render these chart ids (comma separated).
    #[arg(long)]
    charts: Option<String>,
    /// Hide a legend entry before rendering, as CHART:KEY. Repeatable.
    #[arg(long, value_parser = parse_hide)]
    hide: Vec<(String, String)>,
    /// Override a legend color, as CHART:KEY=#RRGGBB. Repeatable.
    #[arg(long, value_parser = parse_color)]
    color: Vec<(String, String, String)>,
    /// Also dump the final legend state as JSON to this path.
    #[arg(long)]
    legend_json: Option<PathBuf>,
    /// Width of each chart (default 800).
    #[arg(long, default_value_t = 800)]
    width: u32,
    /// Height of each chart (default 480).
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Number formatting locale for axis labels (en, de, fr, es, it, pt, nl, ko).
    #[arg(long, default_value = "en")]
    locale: String,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct RowsArgs {
    /// Chart id (e.g. mood-stacked-bar, coffee-consumption).
    #[arg(long)]
    chart: String,
    /// Convert stacked rows into percentage shares.
    #[arg(long, default_value_t = false)]
    percent: bool,
    /// Save rows to file instead of printing them.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortField {
    Title,
    CreatedAt,
}

#[derive(Args, Debug)]
struct PostsArgs {
    /// Free-text search.
    #[arg(long)]
    search: Option<String>,
    /// NOTICE, QNA or FREE.
    #[arg(long, value_parser = parse_category)]
    category: Option<PostCategory>,
    #[arg(long, value_enum)]
    sort_by: Option<SortField>,
    /// Sort descending.
    #[arg(long, default_value_t = false)]
    desc: bool,
    /// Page size.
    #[arg(long)]
    limit: Option<u32>,
    /// Follow the cursor for up to this many pages.
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Use the public mock listing instead of /posts (no token needed).
    #[arg(long, default_value_t = false)]
    mock: bool,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "DASHCHARTS_PASSWORD", hide_env_values = true)]
    password: String,
}

fn parse_hide(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((chart, key)) if !chart.trim().is_empty() && !key.trim().is_empty() => {
            Ok((chart.trim().to_string(), key.trim().to_string()))
        }
        _ => Err(format!("expected CHART:KEY, got {s:?}")),
    }
}

fn parse_color(s: &str) -> Result<(String, String, String), String> {
    let re = Regex::new(r"^([^:=]+):([^=]+)=(#[0-9A-Fa-f]{3}(?:[0-9A-Fa-f]{3})?)$")
        .map_err(|e| e.to_string())?;
    let caps = re
        .captures(s.trim())
        .ok_or_else(|| format!("expected CHART:KEY=#RRGGBB, got {s:?}"))?;
    Ok((
        caps[1].trim().to_string(),
        caps[2].trim().to_string(),
        caps[3].to_string(),
    ))
}

fn parse_category(s: &str) -> Result<PostCategory, String> {
    PostCategory::parse(s).ok_or_else(|| format!("unknown category {s:?} (NOTICE, QNA, FREE)"))
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut client = Client::new(&cli.base_url)?;
    if let Some(t) = cli.token.as_deref() {
        client = client.with_token(t);
    }
    match cli.cmd {
        Command::Render(args) => cmd_render(&client, args),
        Command::Rows(args) => cmd_rows(&client, args),
        Command::Posts(args) => cmd_posts(&client, args),
        Command::Login(args) => cmd_login(&client, args),
        Command::Health => cmd_health(&client),
    }
}

fn status_message(panel: &Panel) -> &'static str {
    match panel.view {
        PanelView::Loading => "Loading…",
        PanelView::Failed => "Failed to load data",
        PanelView::Empty | PanelView::Ready(_) => "No data",
    }
}

fn cmd_render(client: &Client, args: RenderArgs) -> Result<()> {
    let wanted = args.charts.as_deref().map(parse_list);
    let specs: Vec<_> = standard_panels()
        .into_iter()
        .filter(|s| wanted.as_ref().is_none_or(|w| w.iter().any(|id| id == s.chart_id)))
        .collect();
    if specs.is_empty() {
        bail!("no chart matches --charts");
    }

    let panels = load_dashboard(client, &specs);
    let store = LegendStore::new();
    for panel in &panels {
        let Some(binding) = panel.binding(&store) else {
            continue;
        };
        for (chart, key) in &args.hide {
            if chart == binding.chart_id() && binding.is_visible(key) {
                binding.toggle(key);
            }
        }
        for (chart, key, color) in &args.color {
            if chart == binding.chart_id() {
                binding.update_color(key, color);
            }
        }
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create {}", args.out_dir.display()))?;
    let mut written = 0usize;
    for panel in &panels {
        let path = args.out_dir.join(format!("{}.svg", panel.spec.chart_id));
        match panel.render_model(&store) {
            Some(model) => {
                viz::write_svg_locale(&model, &path, args.width, args.height, &args.locale)?
            }
            None => {
                let svg = viz::render_status_svg(
                    panel.spec.title,
                    status_message(panel),
                    args.width,
                    args.height,
                )?;
                std::fs::write(&path, svg).with_context(|| format!("write {}", path.display()))?;
            }
        }
        written += 1;
    }
    eprintln!("Wrote {} chart(s) to {}", written, args.out_dir.display());

    if let Some(path) = args.legend_json.as_ref() {
        let snapshot: serde_json::Map<String, serde_json::Value> = store
            .chart_ids()
            .into_iter()
            .filter_map(|id| {
                let legend = store.get_legend(&id)?;
                Some((id, serde_json::to_value(&*legend).ok()?))
            })
            .collect();
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)
            .with_context(|| format!("write {}", path.display()))?;
        eprintln!("Saved legend state to {}", path.display());
    }
    Ok(())
}

fn cmd_rows(client: &Client, args: RowsArgs) -> Result<()> {
    let Some(spec) = standard_panels()
        .into_iter()
        .find(|s| s.chart_id == args.chart)
    else {
        let ids: Vec<&str> = standard_panels().iter().map(|s| s.chart_id).collect();
        bail!("unknown chart {:?}; known: {}", args.chart, ids.join(", "));
    };

    let panel = build_panel(&spec, &client.fetch_state(spec.endpoint));
    let data = match panel.view {
        PanelView::Ready(data) => data,
        PanelView::Failed => bail!("failed to fetch {}", spec.endpoint.path()),
        PanelView::Loading | PanelView::Empty => {
            eprintln!("{}: no data", spec.chart_id);
            return Ok(());
        }
    };
    let rows = if args.percent && spec.kind.is_stacked() {
        let keys: Vec<String> = data.series.iter().map(|s| s.key.clone()).collect();
        to_percentage_stack(&data.rows, spec.x_key, &keys)
    } else {
        data.rows
    };

    match args.out.as_ref() {
        Some(path) => {
            let fmt = match args.format {
                Some(OutFormat::Csv) => "csv",
                Some(OutFormat::Json) => "json",
                None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
            }
            .to_ascii_lowercase();
            match fmt.as_str() {
                "csv" => storage::save_csv(&rows, path)?,
                "json" => storage::save_json(&rows, path)?,
                other => bail!("unsupported format: {}", other),
            }
            eprintln!("Saved {} rows to {}", rows.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}

fn cmd_posts(client: &Client, args: PostsArgs) -> Result<()> {
    let posts = if args.mock {
        client.mock_posts()?
    } else {
        let filters = PostFilters {
            search: args.search,
            category: args.category,
            sort_by: args.sort_by.map(|s| match s {
                SortField::Title => SortBy::Title,
                SortField::CreatedAt => SortBy::CreatedAt,
            }),
            sort_order: (args.sort_by.is_some() || args.desc).then_some(if args.desc {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            }),
            cursor: None,
            limit: args.limit,
        };
        client.fetch_all_posts(&filters, args.pages)?
    };

    for p in &posts {
        println!(
            "{}  [{}]  {}  ({})",
            p.created_at.format("%Y-%m-%d %H:%M"),
            p.category.label(),
            p.title,
            p.id
        );
    }
    eprintln!("{} post(s)", posts.len());
    Ok(())
}

fn cmd_login(client: &Client, args: LoginArgs) -> Result<()> {
    let session = client.login(&args.email, &args.password)?;
    eprintln!("Logged in as {} ({})", session.user.email, session.user.id);
    println!("{}", session.token);
    Ok(())
}

fn cmd_health(client: &Client) -> Result<()> {
    let h = client.health()?;
    match h.uptime {
        Some(u) => println!("{} (uptime {:.0}s)", h.status, u),
        None => println!("{}", h.status),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hide_and_color_flags_parse() {
        assert_eq!(
            parse_hide("coffee-bar:Starbucks"),
            Ok(("coffee-bar".to_string(), "Starbucks".to_string()))
        );
        assert!(parse_hide("coffee-bar").is_err());
        assert_eq!(
            parse_color("snack-impact:A-morale=#ff0000"),
            Ok((
                "snack-impact".to_string(),
                "A-morale".to_string(),
                "#ff0000".to_string()
            ))
        );
        assert!(parse_color("snack-impact:A-morale=red").is_err());
    }
}
