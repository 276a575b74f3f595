//! Command implementations. Each returns the text to print on stdout.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use agrilend_browser::{FilterMap, FilterOption};
use agrilend_client::{
    ApiClient, CachedOptionSource, CropAnalysis, CropAnalyzer, FetchState, HttpOptionSource,
    HttpRecordSource, ImagePayload, LogSessionExpiry, MockService, OptionSource, PageRequest,
    PageResponse, RecordSource, ScreenData, SearchDebouncer, StaticCredentials, StaticOptions,
};
use anyhow::{bail, Context};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use unicode_width::UnicodeWidthStr;

use crate::config::AppConfig;
use crate::output::{serialize_structured, truncate_to_width, OutputFormat};
use crate::schemas::Listing;
use crate::screen::{apply_mutation, BrowseRequest, Screen};
use crate::view::Message;

/// Reads records from a JSON or YAML file, chosen by extension.
pub fn load_records<T: Listing>(path: &Path) -> anyhow::Result<Vec<T>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let invalid = || format!("invalid {} in {}", T::NAME, path.display());
    let records = match extension(path).as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(&text).with_context(invalid)?,
        _ => serde_json::from_str(&text).with_context(invalid)?,
    };
    Ok(records)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn api_client(config: &AppConfig, base_url: &str) -> anyhow::Result<ApiClient> {
    let credentials = StaticCredentials {
        token: config.token.clone(),
        tenant: config.tenant.clone(),
        branch: config.branch.clone(),
    };
    let client = ApiClient::new(base_url, Arc::new(credentials), Arc::new(LogSessionExpiry))?;
    Ok(client)
}

fn mock_service<T: Listing>(
    config: &AppConfig,
    data: Option<&Path>,
) -> anyhow::Result<MockService<T>> {
    let records = match data {
        Some(path) => load_records(path)?,
        None => T::seed(),
    };
    let service = MockService::new(T::NOUN, records, T::schema()?);
    Ok(service.with_latency(config.mock_latency()))
}

/// Loads records locally (file or seed data) and lets the browser do all the
/// work, or asks the backend for one page when an API URL is configured.
pub async fn browse<T: Listing>(
    config: &AppConfig,
    data: Option<&Path>,
    request: &BrowseRequest,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let mut screen = match (&config.api_url, data) {
        (Some(base_url), None) => {
            return browse_remote::<T>(config, base_url, request, format).await;
        }
        _ => {
            let service = mock_service::<T>(config, data)?;
            Screen::new(service.list().await, config.page_size)?
        }
    };
    screen.apply(request)?;
    finish(&screen, request, format)
}

async fn browse_remote<T: Listing>(
    config: &AppConfig,
    base_url: &str,
    request: &BrowseRequest,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let mut filters = FilterMap::new();
    for (id, value) in &request.filters {
        filters.set(id.as_str(), value.as_str());
    }
    if let Some(value) = request.dates.to_filter_value()? {
        let id = request.date_filter.as_deref().unwrap_or(T::DATE_FILTER);
        filters.set(id, value);
    }
    let page_request = PageRequest::new(
        request.page.unwrap_or(1),
        request.page_size.unwrap_or(config.page_size),
    )
    .search(request.search.clone().unwrap_or_default())
    .filters(filters);

    let source = HttpRecordSource::<T>::new(api_client(config, base_url)?, T::NAME);
    let mut data: ScreenData<PageResponse<T>> = ScreenData::new();
    data.load(source.fetch_page(page_request)).await;

    let mut screen = match data.state() {
        FetchState::Loaded(response) => {
            Screen::from_remote(response.items().to_vec(), response.pagination())?
        }
        FetchState::Failed(message) => bail!("{message}"),
        _ => bail!("{} did not load", T::NAME),
    };

    // Search, filters and paging already happened on the server.
    let local = BrowseRequest {
        search: None,
        filters: Vec::new(),
        dates: Default::default(),
        page: None,
        page_size: None,
        ..request.clone()
    };
    screen.apply(&local)?;
    finish(&screen, request, format)
}

fn finish<T: Listing>(
    screen: &Screen<T>,
    request: &BrowseRequest,
    format: OutputFormat,
) -> anyhow::Result<String> {
    // CSV export without a target file goes to stdout in place of the listing.
    if request.export_file.is_none() {
        if let Some(csv) = screen.take_export() {
            return Ok(csv);
        }
    }
    Ok(screen.render(format)?)
}

/// Live search: each input line is the current content of the search box.
/// Lines are debounced and the listing is printed once typing settles.
pub async fn live<T, R, W>(
    config: &AppConfig,
    data: Option<&Path>,
    input: R,
    out: &mut W,
    format: OutputFormat,
) -> anyhow::Result<usize>
where
    T: Listing,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let service = mock_service::<T>(config, data)?;
    let mut screen = Screen::new(service.list().await, config.page_size)?;
    let (mut debouncer, mut settled) = SearchDebouncer::new(config.debounce());
    let mut lines = input.lines();
    let mut open = true;
    let mut renders = 0;

    loop {
        if !open && !debouncer.is_pending() && settled.is_empty() {
            break;
        }
        tokio::select! {
            line = lines.next_line(), if open => match line.context("cannot read search input")? {
                Some(text) => debouncer.push(text.trim()),
                None => {
                    open = false;
                    debouncer.flush();
                }
            },
            Some(text) = settled.recv() => {
                log::debug!("searching {} for '{text}'", T::NAME);
                screen.browser_mut().set_search(text.as_str());
                writeln!(out, "{}", screen.render(format)?)?;
                renders += 1;
            }
            else => break,
        }
    }
    Ok(renders)
}

async fn cached_options<S: OptionSource>(
    source: S,
    config: &AppConfig,
    filter_id: &str,
) -> anyhow::Result<Vec<FilterOption>> {
    let cache = CachedOptionSource::with_ttl(source, config.option_cache_ttl());
    Ok(cache.fetch_options(filter_id).await?)
}

/// Prints the option list of a select filter.
pub async fn options<T: Listing>(
    config: &AppConfig,
    filter_id: &str,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let schema = T::schema()?;
    if schema.filter(filter_id).is_none() {
        let known: Vec<&str> = schema.filters().iter().map(|f| f.id.as_str()).collect();
        let known = known.join(", ");
        bail!("{} has no filter '{filter_id}' (known: {known})", T::NAME);
    }

    let options = match &config.api_url {
        Some(base_url) => {
            let client = api_client(config, base_url)?;
            let source = HttpOptionSource::new(client, format!("options/{}", T::NAME));
            cached_options(source, config, filter_id).await?
        }
        None => {
            let source = StaticOptions::from_schema(&schema);
            cached_options(source, config, filter_id).await?
        }
    };

    if format.is_structured() {
        return Ok(serialize_structured(&options, format)?);
    }
    if options.is_empty() {
        return Ok(format!("'{filter_id}' has no fixed options\n"));
    }
    let width = options
        .iter()
        .map(|o| UnicodeWidthStr::width(o.label.as_str()))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for option in &options {
        let label = truncate_to_width(&option.label, 40);
        let fill = width.saturating_sub(UnicodeWidthStr::width(label.as_str()));
        out.push_str(&format!("{label}{}  {}\n", " ".repeat(fill), option.value));
    }
    Ok(out)
}

/// Image payload for a file path or an http(s) URL.
pub fn image_payload(target: &str) -> anyhow::Result<ImagePayload> {
    if target.starts_with("http://") || target.starts_with("https://") {
        return Ok(ImagePayload::Url(target.to_string()));
    }
    let path = Path::new(target);
    let bytes = std::fs::read(path).with_context(|| format!("cannot read image {target}"))?;
    let mime = match extension(path).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    };
    Ok(ImagePayload::from_bytes(&bytes, mime))
}

pub async fn analyze(
    config: &AppConfig,
    target: &str,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let payload = image_payload(target)?;
    let analyzer = CropAnalyzer::new(config.analyzer.clone());
    let analysis = analyzer.analyze(&payload).await;
    if format.is_structured() {
        return Ok(serialize_structured(&analysis, format)?);
    }
    Ok(describe_analysis(&analysis, analyzer.is_mock()))
}

fn describe_analysis(analysis: &CropAnalysis, mock: bool) -> String {
    let mut out = String::new();
    if mock {
        out.push_str("(demo analysis: no analyzer key configured)\n");
    }
    let verdict = if analysis.is_damaged {
        "Damaged"
    } else {
        "No damage detected"
    };
    out.push_str(&format!("{verdict}\n"));
    out.push_str(&format!("  Type:       {}\n", analysis.damage_type));
    out.push_str(&format!("  Extent:     {}%\n", analysis.damage_percentage));
    out.push_str(&format!("  Severity:   {:?}\n", analysis.severity));
    out.push_str(&format!("  Confidence: {}%\n", analysis.confidence));
    out.push_str("Recommendations:\n");
    for rec in &analysis.recommendations {
        out.push_str(&format!("  - {rec}\n"));
    }
    out
}

/// Deletes records from the mock service and prints what is left.
pub async fn delete<T: Listing>(
    config: &AppConfig,
    data: Option<&Path>,
    ids: &[String],
    format: OutputFormat,
) -> anyhow::Result<String> {
    let service = mock_service::<T>(config, data)?;
    let mut screen = Screen::new(service.list().await, config.page_size)?;
    let mut deleted = 0;
    for id in ids {
        if apply_mutation(&mut screen, &service, service.delete(id)).await {
            deleted += 1;
        }
    }
    if deleted > 0 {
        let text = format!("deleted {deleted} {}(s)", T::NOUN);
        screen.push_message(Message::success(text));
    }
    Ok(screen.render(format)?)
}
