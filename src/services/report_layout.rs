// src/services/report_layout.rs

use crate::common::format::truncate;

// Alturas aproximadas en mm de cada bloque
const TOP_MARGIN: f64 = 20.0;
const TITLE_HEIGHT: f64 = 12.0;
const HEADING_HEIGHT: f64 = 9.0;
const LINE_HEIGHT: f64 = 6.0;
const SMALL_HEIGHT: f64 = 5.0;
const ROW_HEIGHT: f64 = 8.0;
const RULE_HEIGHT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Ancho y alto de una hoja A4 en mm.
    pub fn page_size(self) -> (u32, u32) {
        match self {
            Orientation::Portrait => (210, 297),
            Orientation::Landscape => (297, 210),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    Normal,
    Bold,
    Small,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub title: String,
    /// Ancho en mm (también es el peso de la columna en la tabla)
    pub width: usize,
    /// Caracteres antes de cortar con "..."
    pub max_chars: Option<usize>,
}

impl Column {
    pub fn new(title: &str, width: usize) -> Self {
        Self { title: title.to_string(), width, max_chars: None }
    }

    pub fn truncated(title: &str, width: usize, max_chars: usize) -> Self {
        Self { title: title.to_string(), width, max_chars: Some(max_chars) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text { text: String, style: TextStyle },
    Spacer(f64),
    Rule,
    TableHeader(Vec<Column>),
    TableRow(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPage {
    pub blocks: Vec<Block>,
}

impl LayoutPage {
    /// Todo el texto de la página, en orden (útil para verificar contenido).
    pub fn texts(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .flat_map(|block| match block {
                Block::Text { text, .. } => vec![text.as_str()],
                Block::TableHeader(columns) => columns.iter().map(|c| c.title.as_str()).collect(),
                Block::TableRow(cells) => cells.iter().map(String::as_str).collect(),
                Block::Spacer(_) | Block::Rule => vec![],
            })
            .collect()
    }
}

/// Resultado de la diagramación, listo para cualquier motor de PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutReport {
    pub title: String,
    pub file_name: String,
    pub orientation: Orientation,
    pub pages: Vec<LayoutPage>,
    /// Una línea de pie por página ("Página i de n", ...)
    pub footers: Vec<Vec<String>>,
}

impl LaidOutReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Diagramador con cursor vertical. Cada bloque verifica el umbral y abre
/// una página nueva si no cabe; el encabezado de la tabla activa se repite.
pub struct ReportLayout {
    title: String,
    orientation: Orientation,
    threshold: f64,
    cursor: f64,
    pages: Vec<LayoutPage>,
    columns: Option<Vec<Column>>,
    footer_note: Option<String>,
}

impl ReportLayout {
    pub fn new(title: &str, orientation: Orientation, threshold: f64) -> Self {
        Self {
            title: title.to_string(),
            orientation,
            threshold,
            cursor: TOP_MARGIN,
            pages: vec![LayoutPage::default()],
            columns: None,
            footer_note: None,
        }
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    fn current(&mut self) -> &mut LayoutPage {
        if self.pages.is_empty() {
            self.pages.push(LayoutPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(LayoutPage::default());
        self.cursor = TOP_MARGIN;
    }

    /// Abre página si el bloque no cabe. Devuelve true si hubo salto.
    fn ensure(&mut self, height: f64) -> bool {
        let page_has_content = !self.current().blocks.is_empty();
        if page_has_content && self.cursor + height > self.threshold {
            self.new_page();
            return true;
        }
        false
    }

    fn push(&mut self, block: Block, height: f64) -> &mut Self {
        self.ensure(height);
        self.current().blocks.push(block);
        self.cursor += height;
        self
    }

    fn text(&mut self, text: impl Into<String>, style: TextStyle, height: f64) -> &mut Self {
        self.push(Block::Text { text: text.into(), style }, height)
    }

    pub fn title(&mut self, text: impl Into<String>) -> &mut Self {
        self.text(text, TextStyle::Title, TITLE_HEIGHT)
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.end_table();
        self.text(text, TextStyle::Heading, HEADING_HEIGHT)
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.text(text, TextStyle::Normal, LINE_HEIGHT)
    }

    pub fn bold(&mut self, text: impl Into<String>) -> &mut Self {
        self.text(text, TextStyle::Bold, LINE_HEIGHT)
    }

    pub fn small(&mut self, text: impl Into<String>) -> &mut Self {
        self.text(text, TextStyle::Small, SMALL_HEIGHT)
    }

    /// "Etiqueta: valor" en una línea.
    pub fn field(&mut self, label: &str, value: impl AsRef<str>) -> &mut Self {
        self.line(format!("{}: {}", label, value.as_ref()))
    }

    pub fn spacer(&mut self, mm: f64) -> &mut Self {
        // Un espacio nunca abre página por sí solo
        if self.cursor + mm <= self.threshold {
            self.current().blocks.push(Block::Spacer(mm));
            self.cursor += mm;
        }
        self
    }

    pub fn rule(&mut self) -> &mut Self {
        self.push(Block::Rule, RULE_HEIGHT)
    }

    /// Inicia una tabla; el encabezado se repite en cada página nueva hasta `end_table`.
    pub fn table(&mut self, columns: Vec<Column>) -> &mut Self {
        // El encabezado no queda solo al final de una página
        self.ensure(ROW_HEIGHT * 2.0);
        self.current().blocks.push(Block::TableHeader(columns.clone()));
        self.cursor += ROW_HEIGHT;
        self.columns = Some(columns);
        self
    }

    pub fn row<S: AsRef<str>>(&mut self, cells: &[S]) -> &mut Self {
        let cells: Vec<String> = match &self.columns {
            Some(columns) => cells
                .iter()
                .enumerate()
                .map(|(i, cell)| match columns.get(i).and_then(|c| c.max_chars) {
                    Some(max) => truncate(cell.as_ref(), max),
                    None => cell.as_ref().to_string(),
                })
                .collect(),
            None => cells.iter().map(|c| c.as_ref().to_string()).collect(),
        };

        if self.ensure(ROW_HEIGHT) {
            if let Some(columns) = self.columns.clone() {
                self.current().blocks.push(Block::TableHeader(columns));
                self.cursor += ROW_HEIGHT;
            }
        }
        self.current().blocks.push(Block::TableRow(cells));
        self.cursor += ROW_HEIGHT;
        self
    }

    pub fn end_table(&mut self) -> &mut Self {
        self.columns = None;
        self
    }

    /// Texto fijo que acompaña al número de página en cada pie.
    pub fn footer_note(&mut self, note: &str) -> &mut Self {
        self.footer_note = Some(note.to_string());
        self
    }

    pub fn finish(self, file_name: impl Into<String>) -> LaidOutReport {
        let total = self.pages.len();
        let footers = (1..=total)
            .map(|i| {
                let mut lines = vec![format!("Página {} de {}", i, total)];
                if let Some(note) = &self.footer_note {
                    lines.push(note.clone());
                }
                lines
            })
            .collect();

        LaidOutReport {
            title: self.title,
            file_name: file_name.into(),
            orientation: self.orientation,
            pages: self.pages,
            footers,
        }
    }
}
