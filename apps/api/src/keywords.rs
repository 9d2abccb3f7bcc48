//! Derives search keywords from a user profile: major → job-keyword table,
//! certification table, and the most recent career position. Fan-out stays
//! bounded at 3 keywords regardless of profile complexity.

use crate::models::UserProfile;

/// Keyword used when the profile yields nothing at all.
pub const DEFAULT_KEYWORD: &str = "신입 채용";

const MAX_KEYWORDS: usize = 3;

/// Major → job keywords. Matched case-insensitively as a bidirectional
/// substring; the first hit contributes its top two keywords.
const MAJOR_TO_JOB_KEYWORDS: &[(&str, &[&str])] = &[
    // IT/computing
    ("컴퓨터", &["백엔드 개발자", "프론트엔드 개발자", "풀스택 개발자", "소프트웨어 엔지니어"]),
    ("소프트웨어", &["소프트웨어 개발자", "백엔드", "프론트엔드", "앱 개발"]),
    ("정보통신", &["IT 엔지니어", "네트워크 엔지니어", "시스템 엔지니어"]),
    ("정보보안", &["보안 엔지니어", "정보보안", "사이버보안"]),
    ("데이터", &["데이터 엔지니어", "데이터 분석가", "AI 엔지니어"]),
    ("인공지능", &["AI 엔지니어", "머신러닝", "딥러닝 엔지니어"]),
    ("게임", &["게임 개발자", "게임 프로그래머", "유니티 개발자"]),
    // Electrical/electronics
    ("전자", &["임베디드 개발자", "펌웨어 엔지니어", "하드웨어 엔지니어"]),
    ("전기", &["전기 엔지니어", "전력 설계", "전기설비"]),
    ("반도체", &["반도체 엔지니어", "공정 엔지니어", "FAB 엔지니어"]),
    ("제어", &["제어 엔지니어", "PLC 프로그래머", "자동화 엔지니어"]),
    // Mechanical/industrial
    ("기계", &["기계 설계", "CAD 엔지니어", "설비 엔지니어"]),
    ("산업", &["생산관리", "품질관리", "QA 엔지니어"]),
    ("자동차", &["자동차 엔지니어", "차량 개발", "모빌리티"]),
    ("항공", &["항공 엔지니어", "항공정비사", "드론 개발"]),
    ("조선", &["조선 엔지니어", "선박 설계", "해양 엔지니어"]),
    // Chemistry/materials/environment
    ("화학", &["화학 연구원", "품질관리", "R&D 연구원"]),
    ("화공", &["공정 엔지니어", "플랜트 엔지니어", "화학공정"]),
    ("재료", &["재료 연구원", "소재 개발", "R&D"]),
    ("환경", &["환경 엔지니어", "환경관리", "ESG 담당자"]),
    ("에너지", &["에너지 엔지니어", "신재생에너지", "전력거래"]),
    // Architecture/civil
    ("건축", &["건축 설계", "건축 시공", "BIM 엔지니어"]),
    ("토목", &["토목 설계", "토목 시공", "구조 엔지니어"]),
    ("도시", &["도시계획", "교통계획", "GIS 분석가"]),
    // Business/economics
    ("경영", &["기획", "전략기획", "사업개발", "경영지원"]),
    ("경제", &["경제분석", "금융", "투자분석", "리서치"]),
    ("회계", &["회계", "재무", "세무", "감사"]),
    ("마케팅", &["마케팅", "브랜드 매니저", "퍼포먼스 마케터", "CRM"]),
    ("무역", &["무역", "수출입", "해외영업", "물류"]),
    ("물류", &["물류관리", "SCM", "유통관리"]),
    ("금융", &["금융", "펀드매니저", "자산관리", "리스크관리"]),
    ("부동산", &["부동산", "자산관리", "PM", "개발사업"]),
    // Humanities/social science
    ("국어", &["콘텐츠 에디터", "카피라이터", "출판 편집"]),
    ("영어", &["통번역", "영어 교육", "해외영업"]),
    ("중국어", &["중국어 통번역", "중국 무역", "중화권 영업"]),
    ("일본어", &["일본어 통번역", "일본 영업", "CS"]),
    ("심리", &["상담사", "UX 리서처", "HR 담당자"]),
    ("사회", &["사회조사분석", "리서치", "정책분석"]),
    ("행정", &["행정", "공무원", "공공기관"]),
    ("법학", &["법무", "컴플라이언스", "계약관리"]),
    // Education
    ("교육", &["교사", "강사", "교육기획", "HRD"]),
    ("유아교육", &["유치원 교사", "보육교사", "아동교육"]),
    ("체육", &["체육교사", "트레이너", "스포츠 마케팅"]),
    // Art/design
    ("디자인", &["UI/UX 디자이너", "그래픽 디자이너", "웹 디자이너"]),
    ("시각", &["그래픽 디자이너", "브랜드 디자이너", "광고 디자이너"]),
    ("산업디자인", &["제품 디자이너", "UX 디자이너", "3D 디자이너"]),
    ("패션", &["패션 디자이너", "MD", "바이어"]),
    ("영상", &["영상 편집자", "PD", "모션그래퍼"]),
    // Medical/health
    ("약학", &["약사", "임상약사", "제약회사"]),
    ("간호", &["간호사", "임상간호사", "보건교사"]),
    ("물리치료", &["물리치료사", "재활치료사", "스포츠 재활"]),
    ("보건", &["보건관리자", "산업보건", "공중보건"]),
    ("영양", &["영양사", "식품", "급식관리"]),
    // Natural science
    ("수학", &["데이터 분석가", "퀀트", "통계분석"]),
    ("통계", &["통계분석가", "데이터 사이언티스트", "리서치"]),
    ("물리", &["연구원", "광학 엔지니어", "물리 시뮬레이션"]),
    ("생명", &["바이오 연구원", "생명공학", "제약"]),
    // Food/agriculture
    ("식품", &["식품연구원", "품질관리", "R&D"]),
    ("조리", &["조리사", "셰프", "F&B"]),
    // Welfare/counseling
    ("사회복지", &["사회복지사", "복지시설", "상담사"]),
    ("상담", &["상담사", "심리상담", "진로상담"]),
    // Media
    ("신문방송", &["기자", "PD", "방송작가"]),
    ("광고홍보", &["광고기획", "PR", "홍보"]),
    ("미디어", &["콘텐츠 크리에이터", "미디어 기획", "디지털 마케팅"]),
    // Tourism/hospitality
    ("관광", &["여행사", "관광기획", "호텔"]),
    ("호텔", &["호텔리어", "객실관리", "F&B"]),
    ("항공서비스", &["승무원", "지상직", "공항"]),
];

/// Certification → job keyword. First table hit per certification wins and
/// contributes exactly one keyword.
const CERT_TO_JOB_KEYWORDS: &[(&str, &[&str])] = &[
    ("정보처리", &["개발자", "IT 엔지니어", "시스템"]),
    ("SQLD", &["데이터 분석", "SQL", "데이터베이스"]),
    ("SQL", &["데이터 엔지니어", "DBA", "데이터 분석"]),
    ("리눅스", &["시스템 엔지니어", "서버 관리자", "DevOps"]),
    ("네트워크", &["네트워크 엔지니어", "보안 엔지니어"]),
    ("보안", &["정보보안", "보안 엔지니어", "ISMS"]),
    ("AWS", &["클라우드 엔지니어", "DevOps", "백엔드"]),
    ("빅데이터", &["데이터 엔지니어", "데이터 분석가"]),
    ("전기", &["전기 엔지니어", "전력 설비", "전기안전"]),
    ("건축", &["건축 설계", "시공관리", "건축사"]),
    ("토목", &["토목 설계", "시공관리", "구조"]),
    ("산업안전", &["안전관리자", "산업안전", "HSE"]),
    ("품질관리", &["QA", "QC", "품질관리"]),
    ("물류", &["물류관리", "SCM", "유통"]),
    ("회계", &["회계", "재무", "세무"]),
    ("세무", &["세무사", "세무회계", "재무"]),
    ("유통", &["유통관리", "MD", "상품기획"]),
    ("사회복지", &["사회복지사", "복지시설", "상담"]),
    ("간호", &["간호사", "임상간호", "보건"]),
    ("영양", &["영양사", "급식관리", "식품"]),
    ("조리", &["조리사", "셰프", "F&B"]),
    ("운전", &["운전", "배송", "물류"]),
];

/// Builds at most [`MAX_KEYWORDS`] search keywords for the given profile:
/// major table hit (top 2) or the literal major, one keyword per matched
/// certification table entry, and the most recent career position.
pub fn generate_search_keywords(profile: Option<&UserProfile>) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();

    if let Some(profile) = profile {
        let major_lower = profile.major.to_lowercase();
        if !major_lower.is_empty() {
            let hit = MAJOR_TO_JOB_KEYWORDS.iter().find(|(key, _)| {
                let key_lower = key.to_lowercase();
                major_lower.contains(&key_lower) || key_lower.contains(&major_lower)
            });

            match hit {
                Some((_, jobs)) => keywords.extend(jobs.iter().take(2).map(|s| s.to_string())),
                None => keywords.push(profile.major.clone()),
            }
        }

        for cert in &profile.certifications {
            if let Some((_, jobs)) = CERT_TO_JOB_KEYWORDS
                .iter()
                .find(|(key, _)| cert.contains(key))
            {
                keywords.push(jobs[0].to_string());
            }
        }

        if let Some(history) = &profile.career_history {
            if let Some(recent) = history.first() {
                if !recent.position.is_empty() {
                    keywords.push(recent.position.clone());
                }
            }
        }
    }

    // Order-preserving dedup, then cap the fan-out.
    let mut unique: Vec<String> = Vec::new();
    for kw in keywords {
        if !unique.contains(&kw) {
            unique.push(kw);
        }
        if unique.len() == MAX_KEYWORDS {
            break;
        }
    }

    if unique.is_empty() {
        return vec![DEFAULT_KEYWORD.to_string()];
    }
    unique
}
