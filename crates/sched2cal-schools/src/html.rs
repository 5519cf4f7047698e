//! Small HTML extraction helpers over `scraper`.
//!
//! All functions take the page as `&str` and return owned data, so parsed
//! documents never live across an `.await`.

use scraper::{ElementRef, Html, Selector};

use sched2cal_core::PortalError;

fn selector(css: &str) -> Result<Selector, PortalError> {
    Selector::parse(css)
        .map_err(|e| PortalError::UnexpectedPage(format!("bad selector {}: {:?}", css, e)))
}

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// `value` attributes of the options inside `<select id="...">`.
pub fn option_values(page: &str, select_id: &str) -> Result<Vec<String>, PortalError> {
    let document = Html::parse_document(page);
    let select_sel = selector(&format!("select#{}", select_id))?;
    let option_sel = selector("option")?;

    let select = document
        .select(&select_sel)
        .next()
        .ok_or_else(|| PortalError::UnexpectedPage(format!("no <select id=\"{}\">", select_id)))?;

    Ok(select
        .select(&option_sel)
        .filter_map(|option| option.value().attr("value"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

/// `value` attribute of `<input id="...">`, if present.
pub fn input_value(page: &str, input_id: &str) -> Result<Option<String>, PortalError> {
    let document = Html::parse_document(page);
    let input_sel = selector(&format!("input#{}", input_id))?;

    Ok(document
        .select(&input_sel)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(|v| v.to_string()))
}

/// Text of every `<td>` for each row matched by `row_css`.
///
/// Rows without cells (header rows using `<th>`) are kept as empty vectors.
pub fn table_rows(page: &str, row_css: &str) -> Result<Vec<Vec<String>>, PortalError> {
    let document = Html::parse_document(page);
    let row_sel = selector(row_css)?;
    let cell_sel = selector("td")?;

    Ok(document
        .select(&row_sel)
        .map(|row| row.select(&cell_sel).map(cell_text).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <form>
            <input type="hidden" id="__VIEWSTATE" value="dDwtMTA4" />
            <select id="TermID">
              <option value="HK01">Học kỳ 1</option>
              <option value="HK02" selected>Học kỳ 2</option>
              <option value="">--</option>
            </select>
          </form>
          <table>
            <tr><th>Mã</th><th>Tên</th></tr>
            <tr height="22px"><td> 841020 </td><td>Lập trình <b>web</b></td></tr>
          </table>
        </body></html>
    "#;

    #[test]
    fn test_option_values_skip_blank() {
        assert_eq!(option_values(PAGE, "TermID").unwrap(), vec!["HK01", "HK02"]);
    }

    #[test]
    fn test_missing_select_is_unexpected_page() {
        assert!(matches!(
            option_values(PAGE, "YearStudy"),
            Err(PortalError::UnexpectedPage(_))
        ));
    }

    #[test]
    fn test_input_value() {
        assert_eq!(
            input_value(PAGE, "__VIEWSTATE").unwrap().as_deref(),
            Some("dDwtMTA4")
        );
        assert_eq!(input_value(PAGE, "__EVENTVALIDATION").unwrap(), None);
    }

    #[test]
    fn test_table_rows_keep_header_rows() {
        let rows = table_rows(PAGE, "tr").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec!["841020", "Lập trình web"]);
    }

    #[test]
    fn test_table_rows_by_attribute() {
        let rows = table_rows(PAGE, r#"tr[height="22px"]"#).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
