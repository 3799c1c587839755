//! Assembly of a slide's synthesized text.

/// Accumulates slide content and renders it either grouped by kind or in
/// shape order.
#[derive(Debug)]
pub(crate) struct SlideTextBuilder {
    number: usize,
    title: String,
    maintain_order: bool,
    ordered: String,
    paragraphs: Vec<String>,
    current: String,
    tables: String,
    charts: String,
    ocr: String,
}

impl SlideTextBuilder {
    pub(crate) fn new(number: usize, title: &str, maintain_order: bool) -> Self {
        Self {
            number,
            title: title.to_string(),
            maintain_order,
            ordered: format!("Slide Number : {}\nSlide Title : {}", number, title),
            paragraphs: Vec::new(),
            current: String::new(),
            tables: String::new(),
            charts: String::new(),
            ocr: String::new(),
        }
    }

    pub(crate) fn push_run(&mut self, run: &str) {
        self.current.push_str(run);
        self.ordered.push_str("\nSlide Text : ");
        self.ordered.push_str(run);
    }

    /// Runs within a paragraph are glued; paragraphs are separated by a space.
    pub(crate) fn end_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.current);
        if !paragraph.trim().is_empty() {
            self.paragraphs.push(paragraph.trim().to_string());
        }
    }

    pub(crate) fn push_table(&mut self, grid: &str) {
        self.tables.push_str(grid);
        self.tables.push('\n');
        self.ordered.push_str("\nSlide Table : ");
        self.ordered.push_str(grid);
    }

    pub(crate) fn push_chart(&mut self, chart: &str) {
        self.charts.push_str(chart);
        self.charts.push('\n');
        self.ordered.push_str("\nSlide Chart : ");
        self.ordered.push_str(chart);
    }

    pub(crate) fn push_image_text(&mut self, text: &str) {
        self.ocr.push_str(text);
        self.ocr.push('\n');
        self.ordered.push_str("\nSlide OCR : ");
        self.ordered.push_str(text);
    }

    pub(crate) fn finish(mut self) -> String {
        self.end_paragraph();
        if self.maintain_order {
            return self.ordered;
        }

        format!(
            "Slide Number {}\nSlide Title : {}\nSlide Text : {}\nSlide Table : \n{}\
             Slide Charts Data : \n{}Slide Image OCR Text : \n{}",
            self.number,
            self.title,
            self.paragraphs.join(" "),
            self.tables,
            self.charts,
            self.ocr,
        )
    }
}
