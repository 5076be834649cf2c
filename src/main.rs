// src/main.rs
use iced::alignment::Horizontal;
use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Row, Space};
use iced::{
    executor, subscription, window, Alignment, Application, Command, Element, Event, Length,
    Settings, Subscription, Theme,
};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod cell_render;
mod data_types;
mod engine;
mod settings;
mod table_state;
mod transform;
mod ui;
mod upload_client;
mod viewer_state;

use cell_render::CellDisplay;
use data_types::{RawSheet, Record};
use settings::{ThemeMode, ThemeStore, ViewerConfig};
use table_state::SortDirection;
use ui::Styles;
use upload_client::{UploadClient, UploadError, SUPPORTED_EXTENSIONS};
use viewer_state::{LoadedSheet, Notification, ViewerState};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const EXPIRY_CHECK_INTERVAL: Duration = Duration::from_secs(1);
const FIRST_COLUMN_WIDTH: f32 = 180.0;
const COLUMN_WIDTH: f32 = 140.0;

pub fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::load();
    log::info!("Sheet Viewer v{} uploading to {}", VERSION, config.endpoint);

    SheetViewer::run(Settings {
        window: window::Settings {
            size: (1024, 768),
            resizable: true,
            ..Default::default()
        },
        ..Settings::with_flags(config)
    })
}

struct SheetViewer {
    config: ViewerConfig,
    client: Arc<UploadClient>,
    theme_store: Option<ThemeStore>,
    theme_mode: ThemeMode,
    state: ViewerState,
}

#[derive(Debug, Clone)]
enum Message {
    ToggleTheme,
    OpenFileDialog,
    FileSelected(Option<PathBuf>),
    FileDropped(PathBuf),
    UploadFinished(String, Result<RawSheet, UploadError>),
    UploadNewFile,
    GlobalFilterChanged(String),
    ColumnFilterChanged(String, String),
    ClearFilters,
    ToggleSort(String),
    OpenLink(String),
    DismissNotification,
    Tick(Instant),
}

impl Application for SheetViewer {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ViewerConfig;

    fn new(config: ViewerConfig) -> (Self, Command<Message>) {
        let theme_store = match ThemeStore::open_default() {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("theme preference will not be saved: {}", e);
                None
            }
        };
        let theme_mode = theme_store
            .as_ref()
            .map(ThemeStore::load)
            .unwrap_or_default();

        (
            SheetViewer {
                client: Arc::new(UploadClient::new(config.endpoint.clone())),
                state: ViewerState::new(Duration::from_secs(config.notification_secs)),
                config,
                theme_store,
                theme_mode,
            },
            Command::none(),
        )
    }

    fn title(&self) -> String {
        match &self.state.sheet {
            Some(sheet) => format!("Sheet Viewer v{} - {}", VERSION, sheet.file_name),
            None => format!("Sheet Viewer v{}", VERSION),
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::ToggleTheme => {
                self.theme_mode = self.theme_mode.toggled();
                if let Some(store) = &self.theme_store {
                    if let Err(e) = store.save(self.theme_mode) {
                        log::warn!("could not save theme preference: {}", e);
                    }
                }
                Command::none()
            }

            Message::OpenFileDialog => {
                if self.state.loading {
                    return Command::none();
                }
                Command::perform(
                    async {
                        FileDialog::new()
                            .add_filter("Excel Files", &SUPPORTED_EXTENSIONS)
                            .pick_file()
                    },
                    Message::FileSelected,
                )
            }

            Message::FileSelected(path_opt) => match path_opt {
                Some(path) => self.start_upload(path),
                None => Command::none(),
            },

            Message::FileDropped(path) => self.start_upload(path),

            Message::UploadFinished(file_name, result) => {
                self.state.finish_upload(&file_name, result, Instant::now());
                Command::none()
            }

            Message::UploadNewFile => {
                self.state.close_sheet();
                Command::none()
            }

            Message::GlobalFilterChanged(value) => {
                self.state.table_state.set_global_filter(value);
                Command::none()
            }

            Message::ColumnFilterChanged(column, value) => {
                self.state.table_state.set_column_filter(&column, value);
                Command::none()
            }

            Message::ClearFilters => {
                self.state.table_state.clear_filters();
                Command::none()
            }

            Message::ToggleSort(column) => {
                self.state.table_state.toggle_sort(&column);
                Command::none()
            }

            Message::OpenLink(url) => {
                if let Err(e) = open_link(&url) {
                    log::warn!("could not open {}: {}", url, e);
                }
                Command::none()
            }

            Message::DismissNotification => {
                self.state.dismiss_notification();
                Command::none()
            }

            Message::Tick(now) => {
                self.state.expire_notification(now);
                Command::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let dropped_files = subscription::events_with(|event, _status| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        });

        if self.state.notification.is_some() {
            Subscription::batch(vec![
                dropped_files,
                iced::time::every(EXPIRY_CHECK_INTERVAL).map(Message::Tick),
            ])
        } else {
            dropped_files
        }
    }

    fn theme(&self) -> Theme {
        ui::iced_theme(self.theme_mode)
    }

    fn view(&self) -> Element<Message> {
        let styles = ui::styles(self.theme_mode);

        let theme_label = match self.theme_mode {
            ThemeMode::Dark => "Light mode",
            ThemeMode::Light => "Dark mode",
        };
        let header = row![
            text("Sheet Viewer").size(24).style(styles.fg),
            Space::with_width(Length::Fill),
            button(text(theme_label).size(14))
                .on_press(Message::ToggleTheme)
                .style(iced::theme::Button::Secondary),
        ]
        .align_items(Alignment::Center)
        .padding(10);

        let body = match &self.state.sheet {
            Some(sheet) => self.sheet_view(sheet, styles),
            None => self.upload_view(styles),
        };

        let mut content = column![header].spacing(10).padding(10);
        if let Some(notification) = &self.state.notification {
            content = content.push(notification_view(notification, styles));
        }
        content = content.push(body).push(
            text(format!("Sheet Viewer v{} - uploads to {}", VERSION, self.config.endpoint))
                .size(12)
                .style(styles.muted_fg),
        );

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

impl SheetViewer {
    fn start_upload(&mut self, path: PathBuf) -> Command<Message> {
        if !self.state.begin_upload(&path, Instant::now()) {
            return Command::none();
        }

        let file_name = display_name(&path);
        let client = Arc::clone(&self.client);
        Command::perform(
            async move {
                let result = client.upload(&path).await;
                (file_name, result)
            },
            |(file_name, result)| Message::UploadFinished(file_name, result),
        )
    }

    fn upload_view(&self, styles: &Styles) -> Element<Message> {
        let mut choose = button(
            text(if self.state.loading { "Uploading..." } else { "Choose File" })
                .horizontal_alignment(Horizontal::Center),
        )
        .padding(12)
        .width(Length::Fixed(200.0));
        if !self.state.loading {
            choose = choose.on_press(Message::OpenFileDialog);
        }

        let content = column![
            text("Upload Your Excel File").size(28).style(styles.fg),
            text("Browse your Excel data as an interactive, sortable and filterable table.")
                .size(16)
                .style(styles.muted_fg),
            text("Choose or drop an .xlsx or .xls file to get started.")
                .size(16)
                .style(styles.muted_fg),
            choose,
        ]
        .spacing(16)
        .align_items(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into()
    }

    fn sheet_view<'a>(&'a self, sheet: &'a LoadedSheet, styles: &'static Styles) -> Element<'a, Message> {
        let summary = row![
            button(text("<- Upload New File").size(14))
                .on_press(Message::UploadNewFile)
                .style(iced::theme::Button::Text),
            Space::with_width(Length::Fill),
            text(format!(
                "{} - {} sheet(s) in {}",
                sheet.sheet_name, sheet.num_of_sheets, sheet.file_name
            ))
            .size(14)
            .style(styles.muted_fg),
        ]
        .align_items(Alignment::Center);

        if sheet.table.is_empty() {
            return column![summary, placeholder("No data available", styles)]
                .spacing(10)
                .into();
        }

        let table_state = &self.state.table_state;
        let filters = row![
            text_input("Search all columns...", &table_state.global_filter)
                .on_input(Message::GlobalFilterChanged)
                .padding(8),
            button(text("Clear Filters").size(14))
                .on_press(Message::ClearFilters)
                .style(iced::theme::Button::Secondary)
                .padding(8),
        ]
        .spacing(10)
        .align_items(Alignment::Center);

        let columns = &sheet.table.columns;
        let header_row = container(
            Row::with_children(
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, name)| header_cell(i, name, table_state.sort_direction(name), table_state.column_filter(name), styles))
                    .collect(),
            )
            .spacing(1),
        )
        .style(ui::background(styles.header_bg));

        let visible = self.state.visible_records();
        let total = sheet.table.records.len();
        let shown = visible.len();

        let body: Element<Message> = if visible.is_empty() {
            placeholder("No results found", styles)
        } else {
            scrollable(Column::with_children(
                visible
                    .into_iter()
                    .enumerate()
                    .map(|(index, record)| self.record_row(index, record, columns, styles))
                    .collect(),
            ))
            .height(Length::Fill)
            .into()
        };

        column![
            summary,
            filters,
            header_row,
            body,
            text(format!("Showing {} of {} rows", shown, total))
                .size(12)
                .style(styles.muted_fg),
        ]
        .spacing(8)
        .height(Length::Fill)
        .into()
    }

    fn record_row(&self, index: usize, record: &Record, columns: &[String], styles: &Styles) -> Element<Message> {
        let cells = columns.iter().enumerate().map(|(i, column)| {
            let display = cell_render::interpret(column, record.get(column));
            let content: Element<Message> = match display {
                CellDisplay::Link(url) => button(text(cell_render::LINK_LABEL).size(14).style(styles.link_fg))
                    .on_press(Message::OpenLink(url))
                    .style(iced::theme::Button::Text)
                    .padding(0)
                    .into(),
                other => text(other.label(&self.config.date_format))
                    .size(14)
                    .style(styles.fg)
                    .into(),
            };
            container(content)
                .width(column_width(i))
                .padding(6)
                .into()
        });

        let row = Row::with_children(cells.collect()).spacing(1);
        if index % 2 == 1 {
            container(row).style(ui::background(styles.stripe_bg)).into()
        } else {
            row.into()
        }
    }
}

fn header_cell<'a>(
    index: usize,
    name: &str,
    direction: Option<SortDirection>,
    filter: &str,
    styles: &Styles,
) -> Element<'a, Message> {
    let column_name = name.to_string();
    let sort_button = button(
        row![
            text(name).size(14).style(styles.header_fg),
            text(SortDirection::indicator(direction)).size(14).style(styles.muted_fg),
        ]
        .spacing(4),
    )
    .on_press(Message::ToggleSort(column_name.clone()))
    .style(iced::theme::Button::Text)
    .padding(0);

    let filter_input = text_input("Filter...", filter)
        .on_input(move |value| Message::ColumnFilterChanged(column_name.clone(), value))
        .size(12)
        .padding(4);

    column![sort_button, filter_input]
        .spacing(4)
        .padding(6)
        .width(column_width(index))
        .into()
}

fn notification_view<'a>(notification: &Notification, styles: &Styles) -> Element<'a, Message> {
    let color = styles.notification_fg(notification.kind);
    container(
        row![
            column![
                text(&notification.title).size(16).style(color),
                text(&notification.message).size(14).style(styles.fg),
            ]
            .spacing(2),
            Space::with_width(Length::Fill),
            button(text("Dismiss").size(12))
                .on_press(Message::DismissNotification)
                .style(iced::theme::Button::Text),
        ]
        .align_items(Alignment::Center),
    )
    .padding(10)
    .width(Length::Fill)
    .style(iced::theme::Container::Box)
    .into()
}

fn placeholder<'a>(message: &str, styles: &Styles) -> Element<'a, Message> {
    container(text(message).size(16).style(styles.muted_fg))
        .width(Length::Fill)
        .padding(32)
        .center_x()
        .into()
}

fn column_width(index: usize) -> Length {
    if index == 0 {
        Length::Fixed(FIRST_COLUMN_WIDTH)
    } else {
        Length::Fixed(COLUMN_WIDTH)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Hands the URL to the platform's default browser.
fn open_link(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    let mut opener = {
        let mut cmd = std::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    };
    #[cfg(target_os = "macos")]
    let mut opener = std::process::Command::new("open");
    #[cfg(all(unix, not(target_os = "macos")))]
    let mut opener = std::process::Command::new("xdg-open");

    opener.arg(url).spawn().map(|_| ())
}
