use iced::widget::scrollable::Viewport;
use iced::widget::{
    button, column, container, horizontal_space, image as picture, row, scrollable, text, Column,
};
use iced::{keyboard, Alignment, ContentFit, Element, Length, Subscription, Task, Theme};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

mod api;
mod config;
mod error;
mod logging;
mod media;
mod state;

use api::PicsumClient;
use config::FeedConfig;
use error::{FetchError, MediaError};
use state::data::Item;
use state::feed::{Applied, FeedState, FetchRequest, FetchResponse, FetchStatus};
use state::scroll::ScrollTrigger;

/// Height of each photo in the list
const PHOTO_HEIGHT: f32 = 200.0;

/// Main application state
struct PicsumFeed {
    config: FeedConfig,
    /// `None` only if the HTTP client could not be built
    client: Option<PicsumClient>,
    /// Displayed list, cursor and fetch record
    feed: FeedState,
    /// Latches "load more" per content height
    scroll_trigger: ScrollTrigger,
    /// Loaded thumbnails by item id
    thumbnails: HashMap<String, picture::Handle>,
    /// Item ids with a thumbnail task running
    pending_thumbnails: HashSet<String>,
    /// Bounds concurrent thumbnail downloads and decodes
    thumbnail_permits: Arc<Semaphore>,
    thumbnail_dir: PathBuf,
    /// Last download result, shown under the status line
    notice: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User pressed the "Get Photos" button (list empty)
    LoadFirstPage,
    /// User asked for the next page (Ctrl/Cmd+N)
    LoadMore,
    /// User pressed "Refresh" (or F5 / Ctrl+R)
    Refresh,
    /// List scrolled; may trigger the next page
    Scrolled(Viewport),
    /// A page request finished
    PageLoaded(FetchResponse),
    /// A thumbnail finished generating (or failed)
    ThumbnailReady(String, Result<PathBuf, MediaError>),
    /// User pressed "Download" on an item
    Download(String),
    /// A download finished
    DownloadComplete(String, Result<PathBuf, MediaError>),
}

impl PicsumFeed {
    /// Create a new instance of the application
    fn new(config: FeedConfig) -> (Self, Task<Message>) {
        let client = match PicsumClient::new(&config) {
            Ok(client) => Some(client),
            Err(err) => {
                error!("HTTP client unavailable: {}", err);
                None
            }
        };

        let thumbnail_dir = media::thumbnail::thumbnail_cache_dir()
            .unwrap_or_else(|| std::env::temp_dir().join("picsum-feed-thumbnails"));

        info!(
            base_url = %config.base_url,
            page_size = config.page_size,
            "Picsum feed ready, thumbnails in {}",
            thumbnail_dir.display()
        );

        let feed = FeedState::new(config.max_page_exclusive);
        (
            PicsumFeed {
                config,
                client,
                feed,
                scroll_trigger: ScrollTrigger::default(),
                thumbnails: HashMap::new(),
                pending_thumbnails: HashSet::new(),
                thumbnail_permits: Arc::new(Semaphore::new(
                    media::thumbnail::THUMBNAIL_CONCURRENCY,
                )),
                thumbnail_dir,
                notice: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadFirstPage => {
                // Ignored by the feed if a request is already running
                let request = self.feed.load(1);
                self.fetch(request)
            }
            Message::LoadMore => {
                let request = self.feed.load_more();
                self.fetch(request)
            }
            Message::Refresh => {
                // Back to page 1; the scroll trigger must fire again
                self.scroll_trigger.reset();
                let request = self.feed.refresh();
                self.fetch(Some(request))
            }
            Message::Scrolled(viewport) => self.on_scroll(
                viewport.absolute_offset().y,
                viewport.bounds().height,
                viewport.content_bounds().height,
            ),
            Message::PageLoaded(response) => match self.feed.apply(response) {
                Applied::Page { page, added } => {
                    debug!(
                        page,
                        added,
                        raw = self.feed.record().data.len(),
                        "Feed updated"
                    );
                    // Fetch thumbnails for any new rows
                    self.request_thumbnails()
                }
                // Failure is shown via the status line; stale pages are dropped
                Applied::Failed | Applied::Stale => Task::none(),
            },
            Message::ThumbnailReady(id, result) => {
                // Either way the id may be requested again later
                self.pending_thumbnails.remove(&id);
                match result {
                    Ok(path) => {
                        self.thumbnails.insert(id, picture::Handle::from_path(path));
                    }
                    Err(err) => warn!(%id, "Thumbnail failed: {}", err),
                }
                Task::none()
            }
            Message::Download(id) => {
                // The row may have vanished after a refresh
                let Some(item) = self.item(&id).cloned() else {
                    return Task::none();
                };
                let Some(client) = self.client.clone() else {
                    self.notice = Some("Download failed: HTTP client unavailable".to_string());
                    return Task::none();
                };
                let Some(dir) = media::download::download_dir() else {
                    self.notice = Some(format!(
                        "Download failed: {}",
                        MediaError::NoDirectory("download")
                    ));
                    return Task::none();
                };

                self.notice = Some(format!("Downloading photo {}...", id));

                // Launch async download task
                Task::perform(
                    media::download::download_item(client, item, dir),
                    move |result| Message::DownloadComplete(id.clone(), result),
                )
            }
            Message::DownloadComplete(id, result) => {
                self.notice = Some(match result {
                    Ok(path) => format!("Saved photo {} to {}", id, path.display()),
                    Err(err) => {
                        warn!(%id, "Download failed: {}", err);
                        format!("Download of photo {} failed: {}", id, err)
                    }
                });
                Task::none()
            }
        }
    }

    /// Scroll position changed; ask for the next page once per content height
    fn on_scroll(
        &mut self,
        offset_y: f32,
        viewport_height: f32,
        content_height: f32,
    ) -> Task<Message> {
        // Nothing to page through until the first load
        if self.feed.items().is_empty() {
            return Task::none();
        }

        let fire = self.scroll_trigger.check(
            offset_y,
            viewport_height,
            content_height,
            self.config.scroll_threshold,
        );
        if !fire {
            return Task::none();
        }

        let request = self.feed.load_more();
        self.fetch(request)
    }

    /// Turn a page request from the feed into a background task
    fn fetch(&self, request: Option<FetchRequest>) -> Task<Message> {
        // The feed declined (in flight, or no pages left)
        let Some(request) = request else {
            return Task::none();
        };

        // Launch async page request; the result comes back as PageLoaded
        Task::perform(
            fetch_page_job(self.client.clone(), request),
            Message::PageLoaded,
        )
    }

    /// Start thumbnail tasks for displayed items that have none yet
    fn request_thumbnails(&mut self) -> Task<Message> {
        let Some(client) = self.client.clone() else {
            return Task::none();
        };

        let missing: Vec<Item> = self
            .feed
            .items()
            .iter()
            .filter(|item| {
                !self.thumbnails.contains_key(&item.id)
                    && !self.pending_thumbnails.contains(&item.id)
            })
            .cloned()
            .collect();

        let mut tasks = Vec::with_capacity(missing.len());
        for item in missing {
            let id = item.id.clone();
            self.pending_thumbnails.insert(id.clone());
            tasks.push(Task::perform(
                media::thumbnail::load_thumbnail(
                    client.clone(),
                    item,
                    self.thumbnail_dir.clone(),
                    self.config.thumbnail_size,
                    self.thumbnail_permits.clone(),
                ),
                move |result| Message::ThumbnailReady(id.clone(), result),
            ));
        }

        Task::batch(tasks)
    }

    fn item(&self, id: &str) -> Option<&Item> {
        self.feed.items().iter().find(|item| item.id == id)
    }

    /// Status line under the header
    fn status_line(&self) -> String {
        match self.feed.status() {
            FetchStatus::NotStarted => "Nothing loaded yet.".to_string(),
            FetchStatus::Loading => match self.feed.in_flight() {
                Some(request) if self.feed.is_refreshing() => {
                    format!("Refreshing (page {})...", request.page)
                }
                Some(request) => format!("Loading page {}...", request.page),
                None => "Loading...".to_string(),
            },
            FetchStatus::Success => {
                let updated = self
                    .feed
                    .last_updated()
                    .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                format!(
                    "{} photos, page {}. Updated {}",
                    self.feed.items().len(),
                    self.feed.cursor(),
                    updated
                )
            }
            FetchStatus::Failed => format!("Failed: {}", self.feed.error_message()),
        }
    }

    /// One row of the list: photo, details and download control
    fn item_card(&self, item: &Item) -> Element<'_, Message> {
        let photo: Element<Message> = match self.thumbnails.get(&item.id) {
            Some(handle) => picture(handle.clone())
                .width(Length::Fill)
                .height(Length::Fixed(PHOTO_HEIGHT))
                .content_fit(ContentFit::Cover)
                .into(),
            None => container(text("Loading image...").size(14))
                .width(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fixed(PHOTO_HEIGHT))
                .into(),
        };

        let details = column![
            text(format!("ID: {}", item.id)),
            text(format!("Author: {}", item.author)),
            text(format!("dn: {}", item.dimensions_label())),
        ]
        .spacing(2);

        let download = button(text("Download").size(14))
            .on_press(Message::Download(item.id.clone()))
            .padding(6);

        column![
            photo,
            row![details, horizontal_space(), download].align_y(Alignment::Center),
        ]
        .spacing(6)
        .into()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            text("Picsum Feed").size(28),
            horizontal_space(),
            button("Refresh").on_press(Message::Refresh).padding(8),
        ]
        .align_y(Alignment::Center)
        .spacing(10);

        let mut content: Column<Message> = column![header, text(self.status_line()).size(14)]
            .spacing(12)
            .padding(20);

        if let Some(notice) = &self.notice {
            content = content.push(text(notice.as_str()).size(13));
        }

        if self.feed.items().is_empty() {
            let idle = !self.feed.is_loading();
            content = content.push(
                container(
                    button(text("Get Photos..."))
                        .on_press_maybe(idle.then_some(Message::LoadFirstPage))
                        .padding(10),
                )
                .center_x(Length::Fill),
            );
        }

        let mut list = Column::with_children(self.feed.items().iter().map(|item| self.item_card(item)))
            .spacing(16)
            .padding([0, 12]);

        if self.feed.is_loading() {
            list = list.push(container(text("Loading...")).center_x(Length::Fill).padding(10));
        }

        content = content.push(
            scrollable(list)
                .on_scroll(Message::Scrolled)
                .width(Length::Fill)
                .height(Length::Fill),
        );

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// F5 or Ctrl/Cmd+R refreshes, Ctrl/Cmd+N loads the next page
    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, modifiers| match key.as_ref() {
            keyboard::Key::Named(keyboard::key::Named::F5) => Some(Message::Refresh),
            keyboard::Key::Character("r") if modifiers.command() => Some(Message::Refresh),
            keyboard::Key::Character("n") if modifiers.command() => Some(Message::LoadMore),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Perform one page request, reporting a missing client as a failed fetch
async fn fetch_page_job(client: Option<PicsumClient>, request: FetchRequest) -> FetchResponse {
    let result = match client {
        Some(client) => client.fetch_page(request.page).await,
        None => Err(FetchError::Request("HTTP client unavailable".to_string())),
    };
    FetchResponse { request, result }
}

/// Load the config file, falling back to defaults on any problem
///
/// A missing file is created with the defaults so it can be edited.
/// Returns the config and a warning to log once tracing is up.
fn load_config() -> (FeedConfig, Option<String>) {
    let Some(path) = FeedConfig::default_path() else {
        return (FeedConfig::default(), None);
    };

    if !path.exists() {
        let config = FeedConfig::default();
        let warning = config
            .save_to(&path)
            .err()
            .map(|err| format!("Could not write default config to {}: {}", path.display(), err));
        return (config, warning);
    }

    match FeedConfig::load_from(&path) {
        Ok(config) => (config, None),
        Err(err) => (
            FeedConfig::default(),
            Some(format!("Ignoring {}: {}", path.display(), err)),
        ),
    }
}

fn main() -> iced::Result {
    let (config, config_warning) = load_config();

    if let Err(err) = logging::init_tracing(&config.log_filter) {
        eprintln!("tracing already initialized: {}", err);
    }
    if let Some(warning) = config_warning {
        warn!("{}", warning);
    }

    iced::application("Picsum Feed", PicsumFeed::update, PicsumFeed::view)
        .theme(PicsumFeed::theme)
        .subscription(PicsumFeed::subscription)
        .centered()
        .run_with(move || PicsumFeed::new(config))
}
