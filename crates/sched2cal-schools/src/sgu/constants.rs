use chrono::NaiveTime;

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const SCHEDULE_ENDPOINT: &str = "/default.aspx?page=thoikhoabieu&sta=1";

pub const SEMESTER_SELECT_ID: &str = "ctl00_ContentPlaceHolder1_ctl00_ddlChonNHHK";
pub const VIEWSTATE_INPUT_ID: &str = "__VIEWSTATE";
pub const SCHEDULE_ROW_CSS: &str = r#"tr[height="22px"]"#;

pub const FIELD_EVENT_TARGET: &str = "__EVENTTARGET";
pub const FIELD_SEMESTER: &str = "ctl00$ContentPlaceHolder1$ctl00$ddlChonNHHK";
pub const FIELD_KIND: &str = "ctl00$ContentPlaceHolder1$ctl00$ddlLoai";
pub const FIELD_BY_PERIOD: &str = "ctl00$ContentPlaceHolder1$ctl00$rad_ThuTiet";
pub const FIELD_BY_SUBJECT: &str = "ctl00$ContentPlaceHolder1$ctl00$rad_MonHoc";

/// Length of one lesson period, in minutes
pub const LESSON_MINUTES: i64 = 50;

/// Start time of a lesson period.
pub fn class_time(period: u32) -> Option<NaiveTime> {
    let (h, m) = match period {
        1 => (7, 0),
        2 => (7, 50),
        3 => (9, 0),
        4 => (9, 50),
        5 => (10, 40),
        6 => (13, 0),
        7 => (13, 50),
        8 => (15, 0),
        9 => (15, 50),
        10 => (16, 40),
        11 => (17, 40),
        12 => (18, 30),
        13 => (19, 20),
        _ => return None,
    };
    NaiveTime::from_hms_opt(h, m, 0)
}

/// Days after the semester's first Monday for a weekday label.
pub fn weekday_offset(label: &str) -> Option<i64> {
    match label.trim() {
        "Hai" => Some(0),
        "Ba" => Some(1),
        "Tư" => Some(2),
        "Năm" => Some(3),
        "Sáu" => Some(4),
        "Bảy" => Some(5),
        "CN" => Some(6),
        _ => None,
    }
}
