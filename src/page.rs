use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Fake News Detector</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            background: linear-gradient(135deg, #0f172a 0%, #581c87 50%, #0f172a 100%);
            color: #fff;
            min-height: 100vh;
            padding: 32px 16px;
        }

        .wrapper {
            max-width: 960px;
            margin: 0 auto;
        }

        header {
            text-align: center;
            margin-bottom: 40px;
        }

        h1 {
            font-size: 3em;
            background: linear-gradient(90deg, #c084fc, #f472b6);
            -webkit-background-clip: text;
            background-clip: text;
            color: transparent;
            margin-bottom: 10px;
        }

        .subtitle {
            color: #cbd5e1;
            font-size: 1.1em;
        }

        .card {
            background: rgba(255, 255, 255, 0.08);
            border: 1px solid rgba(255, 255, 255, 0.15);
            border-radius: 24px;
            box-shadow: 0 20px 60px rgba(0, 0, 0, 0.35);
            padding: 32px;
            margin-bottom: 32px;
            animation: rise 0.4s ease-out;
        }

        @keyframes rise {
            from { opacity: 0; transform: translateY(16px); }
            to { opacity: 1; transform: translateY(0); }
        }

        .tabs {
            display: flex;
            flex-wrap: wrap;
            gap: 12px;
            margin-bottom: 24px;
        }

        .tab {
            border: none;
            border-radius: 12px;
            padding: 12px 24px;
            font-weight: 600;
            font-size: 1em;
            cursor: pointer;
            background: rgba(255, 255, 255, 0.1);
            color: #cbd5e1;
            transition: all 0.2s;
        }

        .tab.active {
            background: #9333ea;
            color: #fff;
            transform: scale(1.05);
        }

        textarea {
            width: 100%;
            height: 160px;
            background: rgba(255, 255, 255, 0.1);
            border: 1px solid rgba(255, 255, 255, 0.2);
            border-radius: 12px;
            padding: 16px;
            color: #fff;
            font-size: 1em;
            resize: none;
        }

        textarea:focus {
            outline: 2px solid #a855f7;
        }

        .upload-area {
            border: 2px dashed rgba(255, 255, 255, 0.3);
            border-radius: 12px;
            padding: 48px 20px;
            text-align: center;
            cursor: pointer;
            transition: border-color 0.2s;
        }

        .upload-area:hover,
        .upload-area.dragover {
            border-color: #a855f7;
        }

        .upload-icon {
            font-size: 3.5em;
            margin-bottom: 12px;
        }

        .upload-hint {
            color: #64748b;
            font-size: 0.9em;
            margin-top: 8px;
        }

        input[type="file"] {
            display: none;
        }

        .hidden {
            display: none !important;
        }

        #analyzeButton {
            width: 100%;
            margin-top: 24px;
            border: none;
            border-radius: 12px;
            padding: 16px;
            font-size: 1.1em;
            font-weight: 700;
            color: #fff;
            cursor: pointer;
            background: linear-gradient(90deg, #9333ea, #db2777);
            transition: transform 0.2s;
        }

        #analyzeButton:hover:enabled {
            transform: scale(1.02);
        }

        #analyzeButton:disabled {
            background: linear-gradient(90deg, #4b5563, #374151);
            cursor: not-allowed;
        }

        .spinner {
            display: inline-block;
            width: 18px;
            height: 18px;
            border: 3px solid rgba(255, 255, 255, 0.3);
            border-top-color: #fff;
            border-radius: 50%;
            animation: spin 1s linear infinite;
            vertical-align: middle;
            margin-right: 8px;
        }

        @keyframes spin {
            0% { transform: rotate(0deg); }
            100% { transform: rotate(360deg); }
        }

        .verdict {
            text-align: center;
            margin-bottom: 24px;
        }

        .verdict-icon {
            font-size: 4em;
        }

        .verdict-label {
            font-size: 2.4em;
            font-weight: 800;
            margin: 8px 0;
        }

        .score {
            font-size: 1.8em;
            font-weight: 700;
        }

        .bar {
            height: 16px;
            background: rgba(255, 255, 255, 0.1);
            border-radius: 999px;
            overflow: hidden;
            margin-bottom: 32px;
        }

        .bar-fill {
            height: 100%;
            width: 0;
            transition: width 1s ease-out;
        }

        .green { color: #22c55e; }
        .red { color: #ef4444; }
        .yellow { color: #eab308; }
        .bg-green { background: #22c55e; }
        .bg-red { background: #ef4444; }
        .bg-yellow { background: #eab308; }

        h3 {
            font-size: 1.5em;
            margin-bottom: 12px;
        }

        .section {
            margin-bottom: 24px;
        }

        .analysis-text,
        .points li {
            color: #cbd5e1;
            line-height: 1.6;
        }

        .points {
            list-style: none;
        }

        .points li::before {
            content: '✔ ';
            color: #c084fc;
        }

        .source {
            display: block;
            background: rgba(255, 255, 255, 0.1);
            border-radius: 8px;
            padding: 12px;
            margin-bottom: 8px;
            color: #c084fc;
            word-break: break-all;
            text-decoration: none;
        }

        footer {
            text-align: center;
            color: #94a3b8;
            margin-top: 24px;
        }
    </style>
</head>
<body>
    <div class="wrapper">
        <header>
            <h1>🛡️ AI Fake News Detector</h1>
            <p class="subtitle">Powered by Google Gemini • Multi-Format Analysis • Real-Time Verification</p>
        </header>

        <div class="card">
            <div class="tabs" id="tabs">
                <button class="tab active" data-tab="text">📝 Headline</button>
                <button class="tab" data-tab="url">🔗 URL</button>
                <button class="tab" data-tab="image">🖼️ Image</button>
                <button class="tab" data-tab="video">🎬 Video</button>
            </div>

            <textarea id="textInput" placeholder="Enter a news headline or article text..."></textarea>

            <div class="upload-area hidden" id="uploadArea">
                <div class="upload-icon" id="uploadIcon">🖼️</div>
                <div id="uploadText">Click to upload image</div>
                <div class="upload-hint">or drag and drop</div>
                <input type="file" id="fileInput">
            </div>

            <button id="analyzeButton" disabled>✨ Analyze with AI</button>
        </div>

        <div class="card hidden" id="result">
            <div class="verdict">
                <div class="verdict-icon" id="verdictIcon"></div>
                <div class="verdict-label" id="verdictLabel"></div>
                <div>
                    <span class="subtitle">Credibility Score:</span>
                    <span class="score" id="scoreValue"></span>
                </div>
            </div>

            <div class="bar"><div class="bar-fill" id="barFill"></div></div>

            <div class="section">
                <h3>✨ AI Analysis</h3>
                <p class="analysis-text" id="analysisText"></p>
            </div>

            <div class="section hidden" id="pointsSection">
                <h3>Key Points</h3>
                <ul class="points" id="pointsList"></ul>
            </div>

            <div class="section hidden" id="sourcesSection">
                <h3>Verified Sources</h3>
                <div id="sourcesList"></div>
            </div>
        </div>

        <footer>Powered by Google Gemini AI • Built with Rust, Axum &amp; Tokio</footer>
    </div>

    <script>
        const VERDICT_COLOR = { real: 'green', fake: 'red' };
        const VERDICT_ICON = { real: '✅', fake: '⚠️' };
        const PLACEHOLDER = {
            text: 'Enter a news headline or article text...',
            url: 'Enter a news article URL...',
        };
        const MEDIA_ICON = { image: '🖼️', video: '🎬' };

        const state = { tab: 'text', input: '', file: null, loading: false };

        const tabs = document.querySelectorAll('.tab');
        const textInput = document.getElementById('textInput');
        const uploadArea = document.getElementById('uploadArea');
        const uploadIcon = document.getElementById('uploadIcon');
        const uploadText = document.getElementById('uploadText');
        const fileInput = document.getElementById('fileInput');
        const analyzeButton = document.getElementById('analyzeButton');
        const resultCard = document.getElementById('result');

        function isMedia(tab) {
            return tab === 'image' || tab === 'video';
        }

        function refreshForm() {
            tabs.forEach((t) => t.classList.toggle('active', t.dataset.tab === state.tab));

            textInput.classList.toggle('hidden', isMedia(state.tab));
            uploadArea.classList.toggle('hidden', !isMedia(state.tab));

            if (isMedia(state.tab)) {
                fileInput.accept = state.tab === 'image' ? 'image/*' : 'video/*';
                uploadIcon.textContent = state.file ? '✅' : MEDIA_ICON[state.tab];
                uploadText.textContent = state.file ? state.file.name : 'Click to upload ' + state.tab;
            } else {
                textInput.placeholder = PLACEHOLDER[state.tab];
            }

            analyzeButton.disabled = state.loading || (!state.input && !state.file);
            if (state.loading) {
                analyzeButton.innerHTML = '<span class="spinner"></span>Analyzing with AI...';
            } else {
                analyzeButton.textContent = '✨ Analyze with AI';
            }
        }

        tabs.forEach((t) => t.addEventListener('click', () => {
            state.tab = t.dataset.tab;
            refreshForm();
        }));

        textInput.addEventListener('input', (e) => {
            state.input = e.target.value;
            refreshForm();
        });

        uploadArea.addEventListener('click', () => fileInput.click());

        uploadArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            uploadArea.classList.add('dragover');
        });

        uploadArea.addEventListener('dragleave', () => {
            uploadArea.classList.remove('dragover');
        });

        uploadArea.addEventListener('drop', (e) => {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            state.file = e.dataTransfer.files[0] || null;
            refreshForm();
        });

        fileInput.addEventListener('change', (e) => {
            state.file = e.target.files[0] || null;
            refreshForm();
        });

        analyzeButton.addEventListener('click', async () => {
            state.loading = true;
            resultCard.classList.add('hidden');
            refreshForm();

            try {
                const formData = new FormData();
                formData.append('type', state.tab);

                if (isMedia(state.tab)) {
                    if (state.file) {
                        formData.append('file', state.file);
                    }
                } else {
                    formData.append('input', state.input);
                }

                const response = await fetch('/api/analyze', {
                    method: 'POST',
                    body: formData
                });

                renderResult(await response.json());
            } catch (error) {
                console.error('Analysis failed:', error);
            } finally {
                state.loading = false;
                refreshForm();
            }
        });

        function barColor(score) {
            if (score >= 70) return 'bg-green';
            if (score >= 40) return 'bg-yellow';
            return 'bg-red';
        }

        function renderResult(result) {
            const color = VERDICT_COLOR[result.verdict] || 'yellow';

            const icon = document.getElementById('verdictIcon');
            icon.textContent = VERDICT_ICON[result.verdict] || '🛡️';
            icon.className = 'verdict-icon ' + color;

            const label = document.getElementById('verdictLabel');
            label.textContent = String(result.verdict).toUpperCase();
            label.className = 'verdict-label ' + color;

            document.getElementById('scoreValue').textContent = result.credibilityScore + '%';
            document.getElementById('analysisText').textContent = result.analysis;

            const bar = document.getElementById('barFill');
            bar.className = 'bar-fill ' + barColor(result.credibilityScore);
            bar.style.width = '0';

            const points = result.keyPoints || [];
            const pointsList = document.getElementById('pointsList');
            pointsList.replaceChildren(...points.map((p) => {
                const li = document.createElement('li');
                li.textContent = p;
                return li;
            }));
            document.getElementById('pointsSection').classList.toggle('hidden', points.length === 0);

            const sources = result.sources || [];
            const sourcesList = document.getElementById('sourcesList');
            sourcesList.replaceChildren(...sources.map((s) => {
                const a = document.createElement('a');
                a.className = 'source';
                a.textContent = s;
                if (/^https?:\/\//i.test(s)) {
                    a.href = s;
                    a.target = '_blank';
                    a.rel = 'noopener noreferrer';
                }
                return a;
            }));
            document.getElementById('sourcesSection').classList.toggle('hidden', sources.length === 0);

            resultCard.classList.remove('hidden');
            requestAnimationFrame(() => {
                bar.style.width = result.credibilityScore + '%';
            });
        }

        refreshForm();
    </script>
</body>
</html>
"#;
