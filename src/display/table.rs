use crate::api::models::{Envelope, Fellowship, Member, Opportunity, Role, User};
use crate::core::permissions::Permission;
use crate::utils::text::{format_date, format_timestamp, or_dash, truncate_text_unicode};
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

/// A record that can be shown as one table row
pub trait TableRow {
    fn headers() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Member {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Email", "Phone", "Status", "Fellowship", "Born"]
    }

    fn cells(&self) -> Vec<String> {
        let fellowship = self
            .fellowship
            .as_ref()
            .map(|f| f.name.as_str())
            .or(self.fellowship_id.as_deref());
        vec![
            self.id.clone(),
            self.full_name(),
            or_dash(self.email.as_deref()),
            or_dash(self.phone.as_deref()),
            self.status.as_str().to_string(),
            or_dash(fellowship),
            format_date(self.date_of_birth.as_ref()),
        ]
    }
}

impl TableRow for Fellowship {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Description", "Leader", "Members"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            or_dash(self.description.as_deref()),
            or_dash(self.leader_id.as_deref()),
            self.members.len().to_string(),
        ]
    }
}

impl TableRow for Envelope {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Number", "Member", "Assigned", "Released"]
    }

    fn cells(&self) -> Vec<String> {
        let member = self
            .member
            .as_ref()
            .map(|m| m.full_name())
            .or_else(|| self.member_id.clone());
        vec![
            self.id.clone(),
            self.envelope_number.to_string(),
            or_dash(member.as_deref()),
            format_timestamp(self.assigned_at.as_ref()),
            format_timestamp(self.released_at.as_ref()),
        ]
    }
}

impl TableRow for Opportunity {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Title", "Description", "Members"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            or_dash(self.description.as_deref()),
            self.members.len().to_string(),
        ]
    }
}

impl TableRow for User {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Email", "Name", "Role", "Active"]
    }

    fn cells(&self) -> Vec<String> {
        let name = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => "-".to_string(),
        };
        let role = self.role.as_ref().map(|r| r.name.as_str()).or(self.role_id.as_deref());
        vec![
            self.id.clone(),
            self.email.clone(),
            name,
            or_dash(role),
            if self.is_active { "yes" } else { "no" }.to_string(),
        ]
    }
}

impl TableRow for Role {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Description", "Admin", "Permissions"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            or_dash(self.description.as_deref()),
            if self.is_admin { "yes" } else { "no" }.to_string(),
            self.permissions.len().to_string(),
        ]
    }
}

/// Row of `permissions list` / `permissions catalog`
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionRow {
    pub permission: String,
    pub allowed: bool,
}

impl TableRow for PermissionRow {
    fn headers() -> Vec<&'static str> {
        vec!["Permission", "Allowed"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.permission.clone(),
            if self.allowed { "yes" } else { "no" }.to_string(),
        ]
    }
}

impl TableRow for Permission {
    fn headers() -> Vec<&'static str> {
        vec!["Permission", "Resource", "Kind"]
    }

    fn cells(&self) -> Vec<String> {
        let kind = match self {
            Permission::Standard(..) => "standard",
            Permission::Custom(_) => "custom",
        };
        vec![
            self.to_string(),
            self.resource().to_string(),
            kind.to_string(),
        ]
    }
}

/// Longest cell content shown in list tables
pub const MAX_CELL_WIDTH: usize = 60;

/// Renders [`TableRow`] records with comfy-table
#[derive(Debug, Clone)]
pub struct TableDisplay {
    max_width: usize,
    use_colors: bool,
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TableDisplay {
    /// Width follows the terminal; colors only when stdout is a terminal
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }

    fn detect_terminal_width() -> usize {
        match terminal::size() {
            Ok((cols, _rows)) => (cols as usize).clamp(40, 200),
            Err(_) => 80,
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_width(self.max_width as u16);
        table
    }

    fn header_cell(&self, text: &str) -> Cell {
        if self.use_colors {
            Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
        } else {
            Cell::new(text)
        }
    }

    /// Rows are wrapped to the table width by comfy-table; only text longer
    /// than [`MAX_CELL_WIDTH`] is cut
    pub fn render<T: TableRow>(&self, rows: &[T]) -> String {
        let mut table = self.new_table();
        table.set_header(T::headers().iter().map(|h| self.header_cell(h)));

        for row in rows {
            let cells = row.cells().into_iter().enumerate().map(|(i, text)| {
                let cell = Cell::new(truncate_text_unicode(&text, MAX_CELL_WIDTH));
                if i == 0 && self.use_colors {
                    cell.fg(Color::Cyan)
                } else {
                    cell
                }
            });
            table.add_row(cells);
        }

        table.to_string()
    }

    /// One record as a two-column field/value table
    pub fn render_record<T: TableRow>(&self, record: &T) -> String {
        let mut table = self.new_table();
        table.set_header(vec![self.header_cell("Field"), self.header_cell("Value")]);
        for (header, value) in T::headers().into_iter().zip(record.cells()) {
            table.add_row(vec![Cell::new(header), Cell::new(value)]);
        }
        table.to_string()
    }

    /// Footer under list output
    pub fn summary(&self, shown: usize, page: u32, page_size: u32, total: Option<u64>) -> String {
        let start = (page.saturating_sub(1) as u64) * page_size as u64;
        match (shown, total) {
            (0, _) => "No records found".to_string(),
            (_, Some(total)) => format!(
                "Showing {}-{} of {} (page {})",
                start + 1,
                start + shown as u64,
                total,
                page
            ),
            (_, None) => format!(
                "Showing {}-{} (page {})",
                start + 1,
                start + shown as u64,
                page
            ),
        }
    }
}
