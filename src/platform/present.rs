use js_sys::Float32Array;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, ImageData, WebGlBuffer, WebGlProgram,
    WebGlRenderingContext as GL, WebGlShader, WebGlTexture,
};

const VERT_SRC: &str = r#"
attribute vec2 a_pos;
varying vec2 v_uv;
void main() {
    // frames arrive top-down
    v_uv = vec2(a_pos.x * 0.5 + 0.5, 0.5 - a_pos.y * 0.5);
    gl_Position = vec4(a_pos, 0.0, 1.0);
}
"#;

const FRAG_SRC: &str = r#"
precision mediump float;
uniform sampler2D u_frame;
varying vec2 v_uv;
void main() {
    vec4 c = texture2D(u_frame, v_uv);
    gl_FragColor = vec4(c.rgb * c.a, c.a);
}
"#;

const QUAD: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

fn compile_shader(gl: &GL, src: &str, kind: u32) -> Result<WebGlShader, String> {
    let shader = gl.create_shader(kind).ok_or("could not create shader")?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if !gl.get_shader_parameter(&shader, GL::COMPILE_STATUS).as_bool().unwrap_or(false) {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        return Err(log);
    }
    Ok(shader)
}

fn link_program(gl: &GL) -> Result<WebGlProgram, String> {
    let vert = compile_shader(gl, VERT_SRC, GL::VERTEX_SHADER)?;
    let frag = compile_shader(gl, FRAG_SRC, GL::FRAGMENT_SHADER)?;
    let program = gl.create_program().ok_or("could not create program")?;
    gl.attach_shader(&program, &vert);
    gl.attach_shader(&program, &frag);
    gl.link_program(&program);
    gl.delete_shader(Some(&vert));
    gl.delete_shader(Some(&frag));
    if !gl.get_program_parameter(&program, GL::LINK_STATUS).as_bool().unwrap_or(false) {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        return Err(log);
    }
    Ok(program)
}

/// Uploads each fluid frame into a texture and draws one linearly filtered quad
pub struct GlPresenter {
    gl: GL,
    program: WebGlProgram,
    quad: WebGlBuffer,
    texture: WebGlTexture,
}

impl GlPresenter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, String> {
        let gl: GL = canvas
            .get_context("webgl")
            .map_err(|e| format!("{e:?}"))?
            .ok_or("webgl unavailable")?
            .dyn_into()
            .map_err(|_| "unexpected context type".to_string())?;

        let program = link_program(&gl)?;
        let quad = gl.create_buffer().ok_or("could not create buffer")?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&quad));
        let vertices = Float32Array::from(&QUAD[..]);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &vertices, GL::STATIC_DRAW);

        let texture = gl.create_texture().ok_or("could not create texture")?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
        // NPOT textures in WebGL1 need clamp + no mipmaps
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);

        gl.use_program(Some(&program));
        let a_pos = gl.get_attrib_location(&program, "a_pos");
        if a_pos < 0 {
            return Err("a_pos attribute missing".into());
        }
        gl.enable_vertex_attrib_array(a_pos as u32);
        gl.vertex_attrib_pointer_with_i32(a_pos as u32, 2, GL::FLOAT, false, 0, 0);
        if let Some(loc) = gl.get_uniform_location(&program, "u_frame") {
            gl.uniform1i(Some(&loc), 0);
        }

        // screen compositing against the page happens in CSS (mix-blend-mode)
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        Ok(Self { gl, program, quad, texture })
    }

    pub fn present(&self, pixels: &[u8], width: u32, height: u32, canvas: (u32, u32)) -> Result<(), String> {
        let gl = &self.gl;
        if gl.is_context_lost() {
            return Err("webgl context lost".into());
        }
        gl.viewport(0, 0, canvas.0 as i32, canvas.1 as i32);
        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            width as i32,
            height as i32,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            Some(pixels),
        )
        .map_err(|e| format!("{e:?}"))?;
        gl.draw_arrays(GL::TRIANGLE_STRIP, 0, 4);
        Ok(())
    }

    pub fn release(&self) {
        self.gl.delete_texture(Some(&self.texture));
        self.gl.delete_buffer(Some(&self.quad));
        self.gl.delete_program(Some(&self.program));
    }
}

/// Software tier: the canvas backing store is the trail surface itself
pub struct CanvasPresenter {
    ctx: CanvasRenderingContext2d,
}

impl CanvasPresenter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("{e:?}"))?
            .ok_or("2d context unavailable")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "unexpected context type".to_string())?;
        Ok(Self { ctx })
    }

    pub fn present(&self, pixels: &[u8], width: u32, height: u32) -> Result<(), JsValue> {
        let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels), width, height)?;
        self.ctx.put_image_data(&image, 0.0, 0.0)
    }
}

pub enum Presenter {
    Gl(GlPresenter),
    Canvas(CanvasPresenter),
    None,
}

impl Presenter {
    pub fn release(&mut self) {
        if let Presenter::Gl(gl) = self {
            gl.release();
        }
        *self = Presenter::None;
    }
}
