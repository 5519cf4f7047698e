use chrono::NaiveTime;

pub const HOME_ENDPOINT: &str = "/Home";
pub const LOGIN_ENDPOINT: &str = "/Login";
pub const LOGOUT_ENDPOINT: &str = "/Login/Logout";
pub const SCHEDULE_API: &str = "/Home/DrawingStudentSchedule_Perior";
pub const SCHEDULE_ENDPOINT: &str = "/Home/Schedules";

pub const YEAR_SELECT_ID: &str = "YearStudy";
pub const TERM_SELECT_ID: &str = "TermID";

pub const FIELD_USERNAME: &str = "txtTaiKhoan";
pub const FIELD_PASSWORD: &str = "txtMatKhau";

/// Length of one lesson period, in minutes
pub const LESSON_MINUTES: i64 = 50;

/// Start time of a lesson period.
pub fn class_time(period: u32) -> Option<NaiveTime> {
    let (h, m) = match period {
        1 => (6, 45),
        2 => (7, 35),
        3 => (8, 25),
        4 => (9, 30),
        5 => (10, 25),
        6 => (11, 10),
        7 => (12, 45),
        8 => (13, 35),
        9 => (14, 25),
        10 => (15, 30),
        11 => (16, 25),
        12 => (17, 10),
        13 => (18, 15),
        14 => (19, 5),
        15 => (19, 55),
        _ => return None,
    };
    NaiveTime::from_hms_opt(h, m, 0)
}
