//! Output formatting for items (table, JSON, markdown, CSV) and raw responses.

use crate::amazon::NormalizedItem;
use crate::config::OutputFormat;
use crate::transform::Output;

/// Formats normalized items and transformer output for display.
pub struct Formatter {
    format: OutputFormat,
    currency: Option<String>,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format, currency: None }
    }

    /// Sets the currency code shown next to prices.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Formats any transformer output.
    pub fn format_output(&self, output: &Output) -> String {
        match output {
            Output::Items(items) => self.format_items(items),
            Output::Text(text) => text.clone(),
            Output::Document(doc) => doc.to_string(),
            Output::Failed => String::new(),
        }
    }

    /// Formats a single item.
    pub fn format_item(&self, item: &NormalizedItem) -> String {
        match self.format {
            OutputFormat::Table => self.table_single(item),
            OutputFormat::Markdown => self.markdown_single(item),
            OutputFormat::Csv => self.csv_items(std::slice::from_ref(item)),
            OutputFormat::Json | OutputFormat::Xml | OutputFormat::Document => self.json_single(item),
        }
    }

    /// Formats multiple items.
    pub fn format_items(&self, items: &[NormalizedItem]) -> String {
        if items.is_empty() {
            return match self.format {
                OutputFormat::Csv => self.csv_header(),
                OutputFormat::Table | OutputFormat::Markdown => "No items found.".to_string(),
                OutputFormat::Json | OutputFormat::Xml | OutputFormat::Document => "[]".to_string(),
            };
        }

        match self.format {
            OutputFormat::Table => self.table_items(items),
            OutputFormat::Markdown => self.markdown_items(items),
            OutputFormat::Csv => self.csv_items(items),
            OutputFormat::Json | OutputFormat::Xml | OutputFormat::Document => self.json_items(items),
        }
    }

    fn price(&self, amount: f64) -> String {
        match &self.currency {
            Some(currency) => format!("{} {:.2}", currency, amount),
            None => format!("{:.2}", amount),
        }
    }

    fn offer(&self, item: &NormalizedItem) -> String {
        if item.has_offer() {
            format!("{:.2}", item.lowest_offer_price)
        } else {
            "N/A".to_string()
        }
    }

    // JSON formatting

    fn json_single(&self, item: &NormalizedItem) -> String {
        serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string())
    }

    fn json_items(&self, items: &[NormalizedItem]) -> String {
        serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_single(&self, item: &NormalizedItem) -> String {
        let mut lines = Vec::new();

        lines.push(format!("ASIN:    {}", item.asin));
        lines.push(format!("Title:   {}", item.title));
        lines.push(format!("URL:     {}", item.url));
        lines.push(format!("List:    {}", self.price(item.list_price)));

        if item.has_offer() {
            let offer = match item.discount_percent() {
                Some(discount) => format!("{} (-{}%)", self.price(item.lowest_offer_price), discount),
                None => self.price(item.lowest_offer_price),
            };
            lines.push(format!("Offer:   {}", offer));
        } else {
            lines.push("Offer:   N/A".to_string());
        }

        if let Some(image) = item.best_image_url() {
            lines.push(format!("Image:   {}", image));
        }

        lines.join("\n")
    }

    fn table_items(&self, items: &[NormalizedItem]) -> String {
        let asin_width = 10;
        let price_width = 10;
        let offer_width = 10;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<asin_width$}  {:<price_width$}  {:<offer_width$}  {}",
            "ASIN", "List", "Offer", "Title"
        ));
        lines.push(format!(
            "{:-<asin_width$}  {:-<price_width$}  {:-<offer_width$}  {:-<title_width$}",
            "", "", "", ""
        ));

        for item in items {
            lines.push(format!(
                "{:<asin_width$}  {:>price_width$}  {:>offer_width$}  {}",
                item.asin,
                format!("{:.2}", item.list_price),
                self.offer(item),
                truncate(&item.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} items", items.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, item: &NormalizedItem) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", item.title));
        lines.push(String::new());

        lines.push(format!("- **ASIN:** {}", item.asin));
        lines.push(format!("- **URL:** [View on Amazon]({})", item.url));
        lines.push(format!("- **List price:** {}", self.price(item.list_price)));

        if item.has_offer() {
            lines.push(format!("- **Lowest offer:** {}", self.price(item.lowest_offer_price)));
        }

        if let Some(image) = item.best_image_url() {
            lines.push(format!("- **Image:** ![{}]({})", item.asin, image));
        }

        lines.join("\n")
    }

    fn markdown_items(&self, items: &[NormalizedItem]) -> String {
        let mut lines = Vec::new();

        lines.push("| ASIN | List | Offer | Title |".to_string());
        lines.push("|------|------|-------|-------|".to_string());

        for item in items {
            lines.push(format!(
                "| {} | {:.2} | {} | [{}]({}) |",
                item.asin,
                item.list_price,
                self.offer(item),
                truncate(&item.title, 40),
                item.url
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} items found*", items.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "asin,title,list_price,lowest_offer_price,url,large_image_url,medium_image_url,small_image_url"
            .to_string()
    }

    fn csv_items(&self, items: &[NormalizedItem]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for item in items {
            lines.push(format!(
                "{},{},{},{},{},{},{},{}",
                item.asin,
                Self::csv_escape(&item.title),
                item.list_price,
                item.lowest_offer_price,
                Self::csv_escape(&item.url),
                Self::csv_escape(&item.large_image_url),
                Self::csv_escape(&item.medium_image_url),
                Self::csv_escape(&item.small_image_url)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens `s` to at most `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
