use chrono::NaiveDate;
use contracts::domain::a001_imported_shipment::ImportRecord;
use contracts::usecases::u501_import_shipments::{SkipReason, SkippedLine, TextLayout};
use once_cell::sync::Lazy;
use regex::Regex;

use super::numeric::{parse_box_count, parse_weight};

/// Минимальное количество колонок в табличной строке
const MIN_COLUMNS: usize = 4;

/// Строка начинается с номера транспорта, за ним разделитель или конец строки
static RECORD_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:[\s:;|]+(.*))?$").unwrap());

/// Номер, склеенный с маршрутом без пробела: `52736285RAH8604-SC`
static GLUED_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(\p{L}.*)$").unwrap());

/// Хвост строки: маршрут и вес, коробки на следующей строке
static ROUTE_WEIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)[\s;|]+(\d[\d.]*(?:,\d+)?)\s*(?i:kg)?$").unwrap()
});

/// Номер, маршрут, вес и коробки в одной строке
static SAME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d+)[\s:;|]+(.+?)[\s;|]+(\d[\d.]*(?:,\d+)?)\s*(?i:kg)?[\s;|]+(\d[\d.]*)\s*(?i:cx|caixas|boxes)?$",
    )
    .unwrap()
});

static WEIGHT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d[\d.]*(?:,\d+)?\s*(?i:kg)?$").unwrap());

static BOX_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d[\d.,]*\s*(?i:cx|caixas|boxes)?$").unwrap());

static DECORATED_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[=*#_~\-]{2,}.*|.*[=*#_~\-]{2,}|[^\d].*:)$").unwrap()
});

const HEADER_WORDS: &[&str] = &[
    "TRANSPORTE", "TRANSPORT", "SAP", "REFERENCE", "ROTAS", "ROTA", "ROUTES", "ROUTE", "PESO",
    "WEIGHT", "CAIXAS", "BOXES", "QTD", "KG", "CX",
];

const HEADER_MARKERS: &[&str] = &["ROTAS", "ROUTES", "PESO", "WEIGHT", "CAIXAS", "BOXES"];

/// Результат разбора вставленного текста
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub layout: TextLayout,
    pub records: Vec<ImportRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Разбор вставленного текста в записи импорта.
///
/// Поддерживаются два формата:
/// - строки с разделителем и строкой заголовка (копия из Excel)
/// - свободный многострочный формат, где запись начинается с номера транспорта
///
/// Разбор никогда не падает: плохие строки пропускаются и попадают в `skipped`.
#[derive(Debug, Clone)]
pub struct TextParser {
    delimiter: char,
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new('\t')
    }
}

impl TextParser {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn parse(&self, text: &str, date: NaiveDate) -> ParseOutput {
        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .collect();

        match self.detect_layout(&lines) {
            TextLayout::Delimited => self.parse_delimited(&lines, date),
            TextLayout::Loose => parse_loose(&lines, date),
        }
    }

    /// Табличный формат, если большинство непустых строк после заголовка
    /// содержат нужное число колонок и начинаются с номера транспорта.
    fn detect_layout(&self, lines: &[(usize, &str)]) -> TextLayout {
        let (rows, table_rows) = lines
            .iter()
            .skip_while(|(_, line)| line.trim().is_empty())
            .skip(1)
            .filter(|(_, line)| !line.trim().is_empty())
            .fold((0usize, 0usize), |(rows, table_rows), (_, line)| {
                let is_table_row = self.is_table_row(line);
                (rows + 1, table_rows + usize::from(is_table_row))
            });
        if table_rows > 0 && table_rows * 2 > rows {
            TextLayout::Delimited
        } else {
            TextLayout::Loose
        }
    }

    fn is_table_row(&self, line: &str) -> bool {
        let mut columns = line.split(self.delimiter);
        let starts_with_reference = columns
            .next()
            .map(|first| first.trim_start().starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(false);
        starts_with_reference && columns.count() + 1 >= MIN_COLUMNS
    }

    fn parse_delimited(&self, lines: &[(usize, &str)], date: NaiveDate) -> ParseOutput {
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        // Первая непустая строка - заголовок
        let rows = lines
            .iter()
            .skip_while(|(_, line)| line.trim().is_empty())
            .skip(1);

        for (line_no, line) in rows {
            if line.trim().is_empty() {
                continue;
            }
            let columns: Vec<&str> = line.split(self.delimiter).collect();
            if columns.len() < MIN_COLUMNS {
                skipped.push(SkippedLine {
                    line_no: *line_no,
                    content: line.to_string(),
                    reason: SkipReason::TooFewColumns {
                        found: columns.len(),
                    },
                });
                continue;
            }
            // Повтор заголовка при вставке нескольких листов
            if is_header_line(&columns.join(" ")) {
                continue;
            }
            let reference = columns[0].trim();
            if reference.is_empty() {
                skipped.push(SkippedLine {
                    line_no: *line_no,
                    content: line.to_string(),
                    reason: SkipReason::NoTransportReference,
                });
                continue;
            }
            records.push(ImportRecord {
                transport_reference: reference.to_string(),
                route: columns[1].trim().to_string(),
                weight: parse_weight(columns[2]),
                box_count: parse_box_count(columns[3]),
                date,
            });
        }

        ParseOutput {
            layout: TextLayout::Delimited,
            records,
            skipped,
        }
    }
}

fn parse_loose(lines: &[(usize, &str)], date: NaiveDate) -> ParseOutput {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let (line_no, raw) = lines[i];
        i += 1;
        let line = raw.trim();
        if line.is_empty() || is_label_line(line) {
            continue;
        }

        let Some((reference, tail)) = record_start(line) else {
            skipped.push(SkippedLine {
                line_no,
                content: raw.to_string(),
                reason: SkipReason::NoTransportReference,
            });
            continue;
        };
        let normalized = match &tail {
            Some(tail) => format!("{} {}", reference, tail),
            None => reference.clone(),
        };

        if let Some(caps) = SAME_LINE.captures(&normalized) {
            records.push(ImportRecord {
                transport_reference: reference,
                route: caps[2].trim().to_string(),
                weight: parse_weight(&caps[3]),
                box_count: parse_box_count(&caps[4]),
                date,
            });
            continue;
        }

        let (mut route, mut weight) = tail
            .as_deref()
            .map(split_route_weight)
            .unwrap_or_default();
        if route.is_empty() {
            if let Some(idx) = next_content_line(lines, i) {
                let candidate = lines[idx].1.trim();
                if is_route_line(candidate) {
                    route = clean_route(candidate);
                    i = idx + 1;
                }
            }
        }
        if route.is_empty() {
            skipped.push(SkippedLine {
                line_no,
                content: raw.to_string(),
                reason: SkipReason::MissingRoute,
            });
            continue;
        }

        if weight.is_none() {
            if let Some(idx) = next_content_line(lines, i) {
                let candidate = lines[idx].1.trim();
                if WEIGHT_LINE.is_match(candidate) && !starts_new_record(lines, idx) {
                    weight = Some(parse_weight(candidate));
                    i = idx + 1;
                }
            }
        }

        let mut box_count = 0;
        if let Some(idx) = next_content_line(lines, i) {
            let candidate = lines[idx].1.trim();
            if BOX_LINE.is_match(candidate) && !starts_new_record(lines, idx) {
                box_count = parse_box_count(candidate);
                i = idx + 1;
            }
        }

        records.push(ImportRecord {
            transport_reference: reference,
            route,
            weight: weight.unwrap_or(0.0),
            box_count,
            date,
        });
    }

    ParseOutput {
        layout: TextLayout::Loose,
        records,
        skipped,
    }
}

/// Номер транспорта и остаток строки после него
fn record_start(line: &str) -> Option<(String, Option<String>)> {
    if let Some(caps) = RECORD_START.captures(line) {
        let tail = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|t| !t.trim().is_empty());
        return Some((caps[1].to_string(), tail));
    }
    // "12kg" и "840cx" - числа, а не номер с маршрутом
    if WEIGHT_LINE.is_match(line) || BOX_LINE.is_match(line) {
        return None;
    }
    GLUED_START
        .captures(line)
        .map(|caps| (caps[1].to_string(), Some(caps[2].to_string())))
}

/// Отделяет вес в конце хвоста, если перед ним есть текст маршрута
fn split_route_weight(tail: &str) -> (String, Option<f64>) {
    let tail = clean_route(tail);
    let split = ROUTE_WEIGHT
        .captures(&tail)
        .filter(|caps| caps[1].chars().any(char::is_alphabetic))
        .map(|caps| (caps[1].trim().to_string(), parse_weight(&caps[2])));
    match split {
        Some((route, weight)) => (route, Some(weight)),
        None => (tail, None),
    }
}

/// Индекс следующей строки с содержимым, пропуская пустые строки и подписи
fn next_content_line(lines: &[(usize, &str)], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&idx| {
        let line = lines[idx].1.trim();
        !line.is_empty() && !is_label_line(line)
    })
}

/// Голый номер, за которым идет маршрут, - это следующая запись, а не число
fn starts_new_record(lines: &[(usize, &str)], idx: usize) -> bool {
    let line = lines[idx].1.trim();
    line.chars().all(|c| c.is_ascii_digit())
        && next_content_line(lines, idx + 1)
            .map(|next| is_route_line(lines[next].1.trim()))
            .unwrap_or(false)
}

fn is_route_line(line: &str) -> bool {
    record_start(line).is_none() && !WEIGHT_LINE.is_match(line) && !BOX_LINE.is_match(line)
}

fn clean_route(text: &str) -> String {
    text.trim_start_matches(|c: char| c == '-' || c == ':' || c == '|' || c.is_whitespace())
        .trim()
        .to_string()
}

fn is_label_line(line: &str) -> bool {
    is_header_line(line) || DECORATED_LABEL.is_match(line)
}

fn is_header_line(line: &str) -> bool {
    let upper = line.to_uppercase();
    let words: Vec<&str> = upper
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    !words.is_empty()
        && words.iter().all(|w| HEADER_WORDS.contains(w))
        && words.iter().any(|w| HEADER_MARKERS.contains(w))
}
