//! The library of pre-authored data reports.

/// Static chart attached to a report.
#[derive(Debug)]
pub struct ReportChart {
    pub title: &'static str,
    pub unit: &'static str,
    pub bars: &'static [(&'static str, f64)],
}

#[derive(Debug)]
pub struct ReportEntry {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub date: &'static str,
    pub chart: ReportChart,
    pub body: &'static [&'static str],
}

pub static REPORTS: &[ReportEntry] = &[
    ReportEntry {
        id: 1,
        title: "제주 감귤 재배면적 변화",
        description: "최근 5년간 노지감귤과 만감류의 재배면적 추이",
        category: "원예작물",
        date: "2024-11-20",
        chart: ReportChart {
            title: "감귤 재배면적",
            unit: "ha",
            bars: &[("2020", 20_209.0), ("2021", 19_978.0), ("2022", 19_799.0), ("2023", 19_503.0), ("2024", 19_349.0)],
        },
        body: &[
            "노지감귤 재배면적은 폐원과 품종 전환이 이어지며 해마다 소폭 줄었다.",
            "같은 기간 한라봉, 레드향, 천혜향 등 만감류 시설 재배는 늘어 전체 감소 폭을 일부 상쇄했다.",
        ],
    },
    ReportEntry {
        id: 2,
        title: "월동채소 생산 동향",
        description: "월동무, 양배추, 당근의 생산량과 출하 시기",
        category: "원예작물",
        date: "2024-09-05",
        chart: ReportChart {
            title: "2023년 월동채소 생산량",
            unit: "천톤",
            bars: &[("월동무", 312.0), ("양배추", 118.0), ("당근", 53.0), ("브로콜리", 17.0)],
        },
        body: &[
            "월동무는 동부 지역 구좌읍과 성산읍에 재배가 집중되어 있다.",
            "당근은 구좌읍 비중이 절반을 넘어 기상 여건에 따라 전국 가격이 크게 흔들린다.",
        ],
    },
    ReportEntry {
        id: 3,
        title: "농가 인구 고령화 현황",
        description: "연령대별 농가 인구 구성과 65세 이상 비중",
        category: "농업경영",
        date: "2024-06-14",
        chart: ReportChart {
            title: "65세 이상 농가인구 비중",
            unit: "%",
            bars: &[("2019", 41.0), ("2020", 43.0), ("2021", 45.0), ("2022", 47.0), ("2023", 49.0)],
        },
        body: &[
            "65세 이상 농가 인구 비중이 해마다 2%p 안팎 늘고 있다.",
            "청년 농업인 유입은 시설원예와 6차 산업 분야에 몰려 있다.",
        ],
    },
    ReportEntry {
        id: 4,
        title: "농가 소득 구조",
        description: "농업소득, 농외소득, 이전소득 구성 비교",
        category: "농업경영",
        date: "2024-03-28",
        chart: ReportChart {
            title: "2023년 농가 평균 소득 구성",
            unit: "백만원",
            bars: &[("농업소득", 17.6), ("농외소득", 24.1), ("이전소득", 12.3), ("비경상소득", 2.2)],
        },
        body: &["농외소득이 농업소득을 앞질러 농가 소득의 가장 큰 몫을 차지한다."],
    },
    ReportEntry {
        id: 5,
        title: "태풍 피해 분석",
        description: "연도별 태풍에 따른 농작물 피해 면적",
        category: "농업재해",
        date: "2023-12-11",
        chart: ReportChart {
            title: "태풍 농작물 피해면적",
            unit: "ha",
            bars: &[("2019", 5_120.0), ("2020", 7_840.0), ("2021", 980.0), ("2022", 3_310.0), ("2023", 640.0)],
        },
        body: &[
            "2020년 마이삭과 하이선이 연이어 지나가며 피해가 가장 컸다.",
            "피해는 수확기를 앞둔 노지감귤과 파종 직후의 월동채소에 집중된다.",
        ],
    },
    ReportEntry {
        id: 6,
        title: "지하수 질산성질소 관측",
        description: "농업지역 관측정의 질산성질소 농도 추이",
        category: "환경",
        date: "2024-08-02",
        chart: ReportChart {
            title: "권역별 평균 질산성질소",
            unit: "mg/L",
            bars: &[("제주시 동부", 4.8), ("제주시 서부", 6.1), ("서귀포시 동부", 3.9), ("서귀포시 서부", 7.2)],
        },
        body: &[
            "서부 중산간 농업지역에서 먹는물 기준의 절반을 넘는 관측정이 늘었다.",
            "화학비료 사용량이 많은 밭작물 지역일수록 농도가 높은 경향이 있다.",
        ],
    },
    ReportEntry {
        id: 7,
        title: "도외 출하 물류",
        description: "품목별 도외 출하 물량과 해상 운송 비중",
        category: "농산물유통",
        date: "2024-10-17",
        chart: ReportChart {
            title: "2023년 품목별 도외 출하량",
            unit: "천톤",
            bars: &[("감귤", 402.0), ("월동무", 226.0), ("양배추", 81.0), ("당근", 39.0), ("마늘", 22.0)],
        },
        body: &["출하 물량의 90% 이상이 제주항과 한림항을 통한 해상 운송에 의존한다."],
    },
    ReportEntry {
        id: 8,
        title: "감귤 도매가격 전망",
        description: "출하 시기별 노지감귤 도매가격과 전망치",
        category: "농산물유통",
        date: "2025-01-09",
        chart: ReportChart {
            title: "노지감귤 월별 도매가격",
            unit: "원/kg",
            bars: &[("10월", 2_150.0), ("11월", 1_890.0), ("12월", 2_030.0), ("1월", 2_410.0), ("2월", 2_620.0)],
        },
        body: &[
            "출하 초기 가격은 당도 기준 미달 물량이 섞이며 낮게 형성된다.",
            "저장 물량이 줄어드는 1월 이후 가격이 오르는 흐름이 반복된다.",
        ],
    },
];

pub fn find(id: u32) -> Option<&'static ReportEntry> {
    REPORTS.iter().find(|r| r.id == id)
}

/// Reports whose title or description contains `query` (case-insensitive)
/// within `category`; `None` means every category.
pub fn filter(query: &str, category: Option<&str>) -> Vec<&'static ReportEntry> {
    let needle = query.trim().to_lowercase();
    REPORTS
        .iter()
        .filter(|r| category.is_none_or(|c| r.category == c))
        .filter(|r| {
            needle.is_empty()
                || r.title.to_lowercase().contains(&needle)
                || r.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Distinct categories in catalog order.
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for r in REPORTS {
        if !out.contains(&r.category) {
            out.push(r.category);
        }
    }
    out
}
