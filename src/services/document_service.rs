// src/services/document_service.rs

use std::path::{Path, PathBuf};

use genpdf::{Element, elements, style};

use crate::{
    common::error::AppError,
    services::report_layout::{Block, Column, LaidOutReport, TextStyle},
};

/// Convierte un reporte ya diagramado en PDF (genpdf) y lo guarda en disco.
#[derive(Debug, Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
    font_family: String,
    export_dir: PathBuf,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn render(&self, report: &LaidOutReport) -> Result<Vec<u8>, AppError> {
        // 1. Fuente desde la carpeta configurada
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None).map_err(|_| {
            AppError::FontNotFound(format!(
                "No se encontró la fuente {} en {}",
                self.font_family,
                self.fonts_dir.display()
            ))
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(report.title.clone());
        let (width, height) = report.orientation.page_size();
        doc.set_paper_size(genpdf::Size::new(f64::from(width), f64::from(height)));

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // 2. Páginas tal como las dejó el diagramador
        for (index, page) in report.pages.iter().enumerate() {
            if index > 0 {
                doc.push(elements::PageBreak::new());
            }

            let mut table: Option<elements::TableLayout> = None;
            for block in &page.blocks {
                match block {
                    Block::TableHeader(columns) => {
                        if let Some(done) = table.take() {
                            doc.push(done);
                        }
                        table = Some(header_table(columns)?);
                    }
                    Block::TableRow(cells) => match table.as_mut() {
                        Some(current) => push_row(current, cells, style::Style::new())?,
                        None => {
                            // Fila suelta (sin encabezado): una línea de texto
                            doc.push(elements::Paragraph::new(cells.join("  ")));
                        }
                    },
                    other => {
                        if let Some(done) = table.take() {
                            doc.push(done);
                        }
                        push_block(&mut doc, other);
                    }
                }
            }
            if let Some(done) = table.take() {
                doc.push(done);
            }

            // 3. Pie de página
            doc.push(elements::Break::new(1.5));
            if let Some(lines) = report.footers.get(index) {
                for line in lines {
                    doc.push(elements::Paragraph::new(line.clone()).styled(style::Style::new().italic().with_font_size(8)));
                }
            }
        }

        // 4. Renderiza a memoria
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(|e| AppError::Pdf(e.to_string()))?;
        Ok(buffer)
    }

    /// Renderiza y escribe `<export_dir>/<file_name>`. Devuelve la ruta final.
    pub async fn export(&self, report: &LaidOutReport) -> Result<PathBuf, AppError> {
        let bytes = self.render(report)?;
        tokio::fs::create_dir_all(&self.export_dir).await?;
        let path = self.export_dir.join(&report.file_name);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("✅ PDF generado: {} ({} páginas)", path.display(), report.page_count());
        Ok(path)
    }
}

fn push_block(doc: &mut genpdf::Document, block: &Block) {
    match block {
        Block::Text { text, style: text_style } => {
            let styled = match text_style {
                TextStyle::Title => style::Style::new().bold().with_font_size(18),
                TextStyle::Heading => style::Style::new().bold().with_font_size(14),
                TextStyle::Bold => style::Style::new().bold().with_font_size(10),
                TextStyle::Normal => style::Style::new().with_font_size(10),
                TextStyle::Small => style::Style::new().with_font_size(8),
            };
            doc.push(elements::Paragraph::new(text.clone()).styled(styled));
        }
        Block::Spacer(mm) => {
            // Break cuenta en líneas de texto (~5 mm)
            doc.push(elements::Break::new(mm / 5.0));
        }
        Block::Rule => {
            doc.push(elements::Paragraph::new("_".repeat(40)));
        }
        Block::TableHeader(_) | Block::TableRow(_) => {}
    }
}

fn header_table(columns: &[Column]) -> Result<elements::TableLayout, AppError> {
    let mut table = elements::TableLayout::new(columns.iter().map(|c| c.width.max(1)).collect());
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    let titles: Vec<String> = columns.iter().map(|c| c.title.clone()).collect();
    push_row(&mut table, &titles, style::Style::new().bold())?;
    Ok(table)
}

fn push_row(table: &mut elements::TableLayout, cells: &[String], cell_style: style::Style) -> Result<(), AppError> {
    let cell_style = cell_style.with_font_size(8);
    let mut row = table.row();
    for cell in cells {
        row = row.element(elements::Paragraph::new(cell.clone()).styled(cell_style));
    }
    row.push().map_err(|e| AppError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::services::reports;

    #[test]
    fn missing_fonts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let service = DocumentService::new(dir.path(), "Roboto", dir.path());
        let now = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();

        let err = service.render(&reports::inventory_report(&[], now)).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
