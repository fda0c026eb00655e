//! Built-in KRX market-data catalog

use super::{IntentCatalog, LookupTable};
use crate::models::{Endpoint, IntentDefinition};
use crate::Result;

struct IntentSeed {
    id: &'static str,
    keywords: &'static [&'static str],
    endpoint: &'static str,
    requires_login: bool,
    parameters: &'static [&'static str],
    description: &'static str,
    examples: &'static [&'static str],
}

const INTENTS: &[IntentSeed] = &[
    // Equities
    IntentSeed {
        id: "stock_price",
        keywords: &["주가", "종가", "시세", "ohlcv", "가격", "얼마", "시가", "고가", "저가", "거래량"],
        endpoint: "/api/stocks/ohlcv",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "주식 가격 조회 (OHLCV)",
        examples: &[
            "삼성전자 주가 알려줘",
            "오늘 SK하이닉스 종가가 얼마야",
            "네이버 시세 조회",
            "삼성전자 주가",
            "현대차 가격",
            "카카오 얼마야",
            "LG전자 오늘 시세",
        ],
    },
    IntentSeed {
        id: "market_cap",
        keywords: &["시가총액", "시총", "총액", "마켓캡"],
        endpoint: "/api/stocks/market-cap",
        requires_login: false,
        parameters: &["market", "date"],
        description: "시가총액 조회",
        examples: &[
            "코스피 시가총액 순위",
            "시총 상위 종목",
            "시가총액 상위 10개",
            "코스닥 시총 순위",
        ],
    },
    IntentSeed {
        id: "fundamental",
        keywords: &["per", "pbr", "배당", "수익률", "eps", "bps", "dps", "기본적"],
        endpoint: "/api/stocks/fundamental",
        requires_login: true,
        parameters: &["market", "date"],
        description: "기본 지표 (PER/PBR/배당)",
        examples: &["삼성전자 PER이 얼마야", "코스피 PBR 평균", "배당수익률 높은 종목"],
    },
    IntentSeed {
        id: "investor_trading",
        keywords: &["투자자", "매매동향", "외국인", "기관", "개인", "순매수", "순매도"],
        endpoint: "/api/stocks/investor-trading",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "투자자별 매매동향",
        examples: &["외국인 순매수 종목", "기관 매매동향", "개인 투자자 순매도"],
    },
    IntentSeed {
        id: "foreign_holding",
        keywords: &[
            "외국인보유",
            "외국인지분",
            "외인보유",
            "외인지분",
            "외국인 보유율",
            "외국인 보유",
            "외인 보유율",
        ],
        endpoint: "/api/stocks/foreign-holding",
        requires_login: true,
        parameters: &["date", "market"],
        description: "외국인 보유 현황",
        examples: &[],
    },
    // ETF / ETN / ELW
    IntentSeed {
        id: "etf_list",
        keywords: &["etf", "상장지수펀드", "etf목록", "etf리스트"],
        endpoint: "/api/etf/all",
        requires_login: false,
        parameters: &["date"],
        description: "ETF 전종목 조회",
        examples: &["ETF 전체 목록", "상장지수펀드 리스트"],
    },
    IntentSeed {
        id: "etf_price",
        keywords: &["etf가격", "etf시세", "etf종가"],
        endpoint: "/api/etf/ohlcv",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "ETF 가격 조회",
        examples: &[],
    },
    IntentSeed {
        id: "etf_pdf",
        keywords: &["etf구성", "pdf", "포트폴리오", "etf종목"],
        endpoint: "/api/etf/pdf",
        requires_login: false,
        parameters: &["ticker", "date"],
        description: "ETF PDF(구성종목)",
        examples: &[],
    },
    IntentSeed {
        id: "etn_list",
        keywords: &["etn", "상장지수증권", "etn목록"],
        endpoint: "/api/etn/all",
        requires_login: false,
        parameters: &["date"],
        description: "ETN 전종목 조회",
        examples: &[],
    },
    IntentSeed {
        id: "elw_list",
        keywords: &["elw", "주식워런트증권", "워런트"],
        endpoint: "/api/elw/all",
        requires_login: false,
        parameters: &["date"],
        description: "ELW 전종목 조회",
        examples: &[],
    },
    // Short selling
    IntentSeed {
        id: "short_selling",
        keywords: &["공매도", "숏", "대차", "차입", "대주"],
        endpoint: "/api/short-selling/trading",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "공매도 거래 현황",
        examples: &["공매도 현황", "대차거래 조회"],
    },
    IntentSeed {
        id: "short_balance",
        keywords: &["공매도잔고", "숏잔고", "대차잔고"],
        endpoint: "/api/short-selling/balance",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "공매도 잔고 현황",
        examples: &[],
    },
    // Indices
    IntentSeed {
        id: "index_price",
        keywords: &[
            "지수", "코스피", "코스닥", "인덱스", "kospi", "kosdaq", "코스피200", "코스닥150",
            "krx100", "krx300",
        ],
        endpoint: "/api/index/ohlcv",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "지수 시세 조회",
        examples: &["코스피 지수", "코스닥 시세"],
    },
    IntentSeed {
        id: "index_fundamental",
        keywords: &["지수per", "지수pbr", "지수배당"],
        endpoint: "/api/index/fundamental",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "지수 기본 지표",
        examples: &[],
    },
    // Derivatives
    IntentSeed {
        id: "futures_price",
        keywords: &["선물", "futures", "코스피200선물"],
        endpoint: "/api/futures/ohlcv",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "선물 가격 조회",
        examples: &["코스피200 선물 가격", "선물 시세"],
    },
    IntentSeed {
        id: "options_price",
        keywords: &["옵션", "options", "콜옵션", "풋옵션"],
        endpoint: "/api/options/ohlcv",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "옵션 가격 조회",
        examples: &[],
    },
    // Bonds
    IntentSeed {
        id: "bond_price",
        keywords: &["채권", "국채", "회사채", "bond"],
        endpoint: "/api/bond/ohlcv",
        requires_login: false,
        parameters: &["ticker", "start_date", "end_date"],
        description: "채권 가격 조회",
        examples: &[],
    },
    // Raw KRX data screens
    IntentSeed {
        id: "krx_bld",
        keywords: &["bld", "krx데이터", "krx조회", "상세데이터"],
        endpoint: "/api/krx/bld",
        requires_login: true,
        parameters: &["bld_id", "params"],
        description: "KRX BLD 데이터 조회",
        examples: &[],
    },
    // Service
    IntentSeed {
        id: "server_status",
        keywords: &["상태", "status", "서버", "로그인상태"],
        endpoint: "/api/status",
        requires_login: false,
        parameters: &[],
        description: "서버 상태 확인",
        examples: &[],
    },
    IntentSeed {
        id: "ticker_search",
        keywords: &["티커", "종목코드", "코드검색", "ticker"],
        endpoint: "/api/ticker/search",
        requires_login: false,
        parameters: &["query", "market"],
        description: "티커 검색",
        examples: &[],
    },
    IntentSeed {
        id: "comprehensive_analysis",
        keywords: &["분석", "종합", "전체", "리포트", "요약"],
        endpoint: "MULTI",
        requires_login: true,
        parameters: &["ticker"],
        description: "종합 분석 (여러 API 조합)",
        examples: &["삼성전자 종합 분석해줘", "현대차 전체 리포트"],
    },
];

// Scanned in order and the first contained name wins, so a name must come
// before any shorter name that is its prefix.
const TICKERS: &[(&str, &str)] = &[
    // Samsung
    ("삼성전자", "005930"),
    ("삼성sdi", "006400"),
    ("삼성물산", "028260"),
    ("삼성생명", "032830"),
    ("삼성화재", "000810"),
    ("삼성에스디에스", "018260"),
    // SK
    ("sk하이닉스", "000660"),
    ("sk텔레콤", "017670"),
    ("sk이노베이션", "096770"),
    ("sk스퀘어", "402340"),
    ("sk", "034730"),
    // Hyundai
    ("현대차", "005380"),
    ("기아", "000270"),
    ("현대모비스", "012330"),
    ("현대글로비스", "086280"),
    // LG
    ("lg전자", "066570"),
    ("lg화학", "051910"),
    ("lg에너지솔루션", "373220"),
    ("lg디스플레이", "034220"),
    // Other large caps
    ("네이버", "035420"),
    ("카카오", "035720"),
    ("셀트리온", "068270"),
    ("포스코홀딩스", "005490"),
    ("kb금융", "105560"),
    ("신한지주", "055550"),
    ("하나금융지주", "086790"),
    ("삼성바이오로직스", "207940"),
    ("현대중공업", "329180"),
    ("크래프톤", "259960"),
    ("두산에너빌리티", "034020"),
    // Small / mid caps
    ("에코프로비엠", "247540"),
    ("에코프로", "086520"),
    ("포스코퓨처엠", "003670"),
];

const INDICES: &[(&str, &str)] = &[
    ("코스피200", "1028"),
    ("코스피100", "1034"),
    ("코스피50", "1035"),
    ("코스피", "1001"),
    ("코스닥150", "2203"),
    ("코스닥", "2001"),
    ("krx100", "5042"),
    ("krx300", "5300"),
];

const MARKETS: &[(&str, &str)] = &[
    ("코스피", "KOSPI"),
    ("kospi", "KOSPI"),
    ("코스닥", "KOSDAQ"),
    ("kosdaq", "KOSDAQ"),
    ("전체", "ALL"),
    ("all", "ALL"),
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn krx_intents() -> Vec<IntentDefinition> {
    INTENTS
        .iter()
        .map(|seed| IntentDefinition {
            id: seed.id.to_string(),
            keywords: to_strings(seed.keywords),
            endpoint: Endpoint::parse(seed.endpoint),
            requires_login: seed.requires_login,
            parameters: to_strings(seed.parameters),
            description: seed.description.to_string(),
            examples: to_strings(seed.examples),
        })
        .collect()
}

pub fn krx_catalog() -> Result<IntentCatalog> {
    IntentCatalog::new(
        krx_intents(),
        LookupTable::new("ticker", TICKERS.iter().copied())?,
        LookupTable::new("index", INDICES.iter().copied())?,
        LookupTable::new("market", MARKETS.iter().copied())?,
    )
}
